use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, ads)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                TEXT PRIMARY KEY,
                provider_subject  TEXT NOT NULL UNIQUE,
                email             TEXT NOT NULL,
                created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE ads (
                id               TEXT PRIMARY KEY,
                owner_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title            TEXT NOT NULL,
                description      TEXT NOT NULL,
                destination_url  TEXT NOT NULL,
                status           TEXT NOT NULL DEFAULT 'active'
                                 CHECK (status IN ('active', 'inactive')),
                created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_ads_owner_created
                ON ads(owner_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
