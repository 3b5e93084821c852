/// Database row types: these map directly to SQLite rows.
/// Distinct from adly-types models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub provider_subject: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct AdRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub destination_url: String,
    pub status: String,
    pub created_at: String,
}
