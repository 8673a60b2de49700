use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS recordings (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            url         TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_recordings_created
            ON recordings(created_at);

        CREATE INDEX IF NOT EXISTS idx_recordings_name
            ON recordings(name);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
