//! Database row types — these map directly to SQLite rows.
//! Distinct from the reelbox-types API models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

pub struct RecordingRow {
    pub id: String,
    pub name: String,
    pub url: String,
    pub created_at: String,
}

/// The portal-configuration sentinel row, already unpacked: the slug is
/// stored in the row's `url` column.
pub struct PortalConfigRow {
    pub slug: String,
    pub created_at: String,
}

impl RecordingRow {
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        parse_timestamp(&self.created_at)
    }
}

impl PortalConfigRow {
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        parse_timestamp(&self.created_at)
    }
}

/// Rows we write carry RFC 3339 timestamps, but the schema's
/// `datetime('now')` default produces "YYYY-MM-DD HH:MM:SS" without a
/// timezone. Accept both, parsing the latter as naive UTC.
pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", value, e);
            DateTime::default()
        })
}
