use crate::Database;
use crate::models::{AdRow, UserRow};
use adly_types::models::AdFields;
use anyhow::Result;
use rusqlite::{Connection, Row};

const AD_COLUMNS: &str =
    "id, owner_id, title, description, destination_url, status, created_at";

impl Database {
    // -- Users --

    /// Insert a user the first time a provider subject signs in; later
    /// sign-ins refresh the email and keep the original id.
    pub fn upsert_user(&self, id: &str, provider_subject: &str, email: &str) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, provider_subject, email) VALUES (?1, ?2, ?3)
                 ON CONFLICT(provider_subject) DO UPDATE SET email = excluded.email",
                (id, provider_subject, email),
            )?;
            let row = conn.query_row(
                "SELECT id, provider_subject, email, created_at FROM users WHERE provider_subject = ?1",
                [provider_subject],
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, provider_subject, email, created_at FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Ads --

    /// All ads of one owner, newest first.
    pub fn list_ads(&self, owner_id: &str) -> Result<Vec<AdRow>> {
        self.with_conn(|conn| query_ads_for_owner(conn, owner_id))
    }

    pub fn get_ad(&self, id: &str, owner_id: &str) -> Result<Option<AdRow>> {
        self.with_conn(|conn| query_ad(conn, id, owner_id))
    }

    pub fn insert_ad(&self, id: &str, owner_id: &str, fields: &AdFields) -> Result<AdRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ads (id, owner_id, title, description, destination_url, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id,
                    owner_id,
                    fields.title,
                    fields.description,
                    fields.destination_url,
                    fields.status.as_str(),
                ],
            )?;
            query_ad(conn, id, owner_id)?
                .ok_or_else(|| anyhow::anyhow!("Ad {} vanished after insert", id))
        })
    }

    /// Full-field update. `None` when no ad with this id belongs to the owner.
    pub fn update_ad(&self, id: &str, owner_id: &str, fields: &AdFields) -> Result<Option<AdRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE ads SET title = ?1, description = ?2, destination_url = ?3, status = ?4
                 WHERE id = ?5 AND owner_id = ?6",
                rusqlite::params![
                    fields.title,
                    fields.description,
                    fields.destination_url,
                    fields.status.as_str(),
                    id,
                    owner_id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_ad(conn, id, owner_id)
        })
    }

    /// Returns false when nothing matched (absent or owned by someone else).
    pub fn delete_ad(&self, id: &str, owner_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM ads WHERE id = ?1 AND owner_id = ?2",
                (id, owner_id),
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_ads_for_owner(conn: &Connection, owner_id: &str) -> Result<Vec<AdRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM ads WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC",
        AD_COLUMNS
    ))?;

    let rows = stmt
        .query_map([owner_id], ad_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_ad(conn: &Connection, id: &str, owner_id: &str) -> Result<Option<AdRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM ads WHERE id = ?1 AND owner_id = ?2",
        AD_COLUMNS
    ))?;

    let row = stmt.query_row([id, owner_id], ad_from_row).optional()?;
    Ok(row)
}

fn ad_from_row(row: &Row<'_>) -> rusqlite::Result<AdRow> {
    Ok(AdRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        destination_url: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        provider_subject: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
