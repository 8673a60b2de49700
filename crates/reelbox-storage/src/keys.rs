//! Object-key derivation and recovery.
//!
//! Respondent display names are attacker-controlled free text. They are kept
//! verbatim in the metadata row but stripped to a safe alphabet before they
//! touch an object key.

use chrono::{DateTime, Utc};

/// Lowercase the name and replace every non-alphanumeric character with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// File extension for the upload, from the client's MIME type.
pub fn extension_for(content_type: &str) -> &'static str {
    if content_type.contains("mp4") { "mp4" } else { "webm" }
}

/// `recording-<unix-millis>-<sanitized-name>.<ext>`: the timestamp keeps
/// keys collision-free and the sanitizer keeps them injection-free.
pub fn derive_object_key(name: &str, content_type: &str, now: DateTime<Utc>) -> String {
    format!(
        "recording-{}-{}.{}",
        now.timestamp_millis(),
        sanitize_name(name),
        extension_for(content_type)
    )
}

/// Drop transient query-string signing parameters, keeping the canonical
/// location.
pub fn strip_signing_params(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Recover the object key from a stored canonical URL. Keys are flat names,
/// so the last path segment is the whole key.
pub fn object_key_from_url(url: &str) -> Option<String> {
    let key = strip_signing_params(url).rsplit('/').next()?;
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Keys the server hands out are flat names over a small alphabet; anything
/// with a path separator or other URL-significant character did not come
/// from us.
pub fn is_valid_object_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
