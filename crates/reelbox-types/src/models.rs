use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business-rule lifetime of both a recording and the portal link.
pub const EXPIRY_WINDOW_DAYS: i64 = 7;

pub fn expiry_window() -> Duration {
    Duration::days(EXPIRY_WINDOW_DAYS)
}

/// A recording (or the portal link) is expired once it is strictly older
/// than the window.
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at > expiry_window()
}

pub fn expires_at(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + expiry_window()
}

/// A submitted recording as the API exposes it.
///
/// `url` is context-dependent: the admin list carries the canonical storage
/// location, while a single-recording fetch carries a freshly minted
/// short-lived view URL instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub is_expired: bool,
}

/// Outcome of a portal access check. The active slug and expiry instant are
/// included even when access is denied so a caller can render "link active
/// until X".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalStatus {
    pub allowed: bool,
    pub slug: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PortalStatus {
    pub fn denied() -> Self {
        Self {
            allowed: false,
            slug: None,
            expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_recording_is_not_expired() {
        let now = Utc::now();
        assert!(!is_expired(now, now));
        assert!(!is_expired(now - Duration::days(6), now));
    }

    #[test]
    fn exactly_seven_days_is_still_valid() {
        let now = Utc::now();
        assert!(!is_expired(now - Duration::days(7), now));
    }

    #[test]
    fn eight_days_old_is_expired() {
        let now = Utc::now();
        assert!(is_expired(now - Duration::days(8), now));
        assert!(is_expired(now - Duration::days(7) - Duration::seconds(1), now));
    }

    #[test]
    fn expires_at_is_created_at_plus_window() {
        let created = Utc::now();
        assert_eq!(expires_at(created), created + Duration::days(7));
    }
}
