use crate::models::{PortalConfigRow, RecordingRow};
use crate::{Database, PORTAL_SENTINEL_NAME};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

impl Database {
    // -- Recordings --

    /// Insert a recording row. The id is minted here, not supplied by
    /// callers, so a row's identity always comes from the store.
    pub fn insert_recording(
        &self,
        name: &str,
        url: &str,
        created_at: DateTime<Utc>,
    ) -> Result<RecordingRow> {
        let id = Uuid::new_v4().to_string();
        let created = created_at.to_rfc3339();

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO recordings (id, name, url, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, name, url, created],
            )?;
            Ok(())
        })?;

        Ok(RecordingRow {
            id,
            name: name.to_string(),
            url: url.to_string(),
            created_at: created,
        })
    }

    /// Fetch a single recording. The sentinel row is invisible here even if
    /// its id leaks.
    pub fn get_recording(&self, id: &str) -> Result<Option<RecordingRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, url, created_at FROM recordings
                     WHERE id = ?1 AND name <> ?2",
                    rusqlite::params![id, PORTAL_SENTINEL_NAME],
                    row_to_recording,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// All recordings, newest first, excluding the portal sentinel.
    pub fn list_recordings(&self) -> Result<Vec<RecordingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, url, created_at FROM recordings
                 WHERE name <> ?1
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([PORTAL_SENTINEL_NAME], row_to_recording)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns true if a row was actually removed.
    pub fn delete_recording(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM recordings WHERE id = ?1 AND name <> ?2",
                rusqlite::params![id, PORTAL_SENTINEL_NAME],
            )?;
            Ok(affected > 0)
        })
    }

    // -- Portal configuration (sentinel row) --

    pub fn get_portal_config(&self) -> Result<Option<PortalConfigRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT url, created_at FROM recordings WHERE name = ?1",
                    [PORTAL_SENTINEL_NAME],
                    |row| {
                        Ok(PortalConfigRow {
                            slug: row.get(0)?,
                            created_at: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Rotation is delete-then-insert, never update-in-place: a crash between
    /// the two statements leaves zero active portals, which is the safe
    /// direction.
    pub fn replace_portal_config(&self, slug: &str, created_at: DateTime<Utc>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "DELETE FROM recordings WHERE name = ?1",
                [PORTAL_SENTINEL_NAME],
            )?;
            conn.execute(
                "INSERT INTO recordings (id, name, url, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    PORTAL_SENTINEL_NAME,
                    slug,
                    created_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }
}

fn row_to_recording(row: &rusqlite::Row) -> rusqlite::Result<RecordingRow> {
    Ok(RecordingRow {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn insert_and_get_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        let row = db
            .insert_recording("Jane Doe", "http://store/bucket/key.webm", now)
            .unwrap();
        let fetched = db.get_recording(&row.id).unwrap().unwrap();

        assert_eq!(fetched.name, "Jane Doe");
        assert_eq!(fetched.url, "http://store/bucket/key.webm");
        assert_eq!(fetched.created_at_utc(), row.created_at_utc());
    }

    #[test]
    fn list_is_newest_first_and_skips_sentinel() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        db.insert_recording("old", "http://store/b/old.webm", now - Duration::days(2))
            .unwrap();
        db.insert_recording("new", "http://store/b/new.webm", now)
            .unwrap();
        db.replace_portal_config("ab12cd34", now).unwrap();

        let rows = db.list_recordings().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "new");
        assert_eq!(rows[1].name, "old");
    }

    #[test]
    fn get_never_returns_the_sentinel() {
        let db = Database::open_in_memory().unwrap();
        db.replace_portal_config("ab12cd34", Utc::now()).unwrap();

        let sentinel_id: String = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT id FROM recordings WHERE name = ?1",
                    [PORTAL_SENTINEL_NAME],
                    |row| row.get(0),
                )?)
            })
            .unwrap();

        assert!(db.get_recording(&sentinel_id).unwrap().is_none());
        assert!(!db.delete_recording(&sentinel_id).unwrap());
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let db = Database::open_in_memory().unwrap();
        let row = db
            .insert_recording("x", "http://store/b/x.webm", Utc::now())
            .unwrap();

        assert!(db.delete_recording(&row.id).unwrap());
        assert!(!db.delete_recording(&row.id).unwrap());
        assert!(db.get_recording(&row.id).unwrap().is_none());
    }

    #[test]
    fn replace_portal_config_keeps_a_single_row() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        db.replace_portal_config("first000", now - Duration::days(1))
            .unwrap();
        db.replace_portal_config("second00", now).unwrap();

        let config = db.get_portal_config().unwrap().unwrap();
        assert_eq!(config.slug, "second00");

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM recordings WHERE name = ?1",
                    [PORTAL_SENTINEL_NAME],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn no_portal_config_by_default() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_portal_config().unwrap().is_none());
    }
}
