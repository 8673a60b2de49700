//! Portal State Manager: the single rotating, time-limited token that gates
//! the recording flow.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tokio::task;
use tracing::warn;

use reelbox_db::Database;
use reelbox_types::api::RotatePortalResponse;
use reelbox_types::models::{PortalStatus, expires_at, expiry_window};

use crate::auth::AppState;
use crate::error::ApiError;

const SLUG_BYTES: usize = 16;

/// The slug doubles as a bearer credential for the recording flow, so it is
/// minted from OS randomness.
fn generate_slug() -> String {
    hex::encode(rand::rng().random::<[u8; SLUG_BYTES]>())
}

/// Replace the active portal configuration. Every previously distributed
/// link dies immediately, expired or not.
pub fn rotate(db: &Database, now: DateTime<Utc>) -> anyhow::Result<RotatePortalResponse> {
    let slug = generate_slug();
    db.replace_portal_config(&slug, now)?;
    Ok(RotatePortalResponse {
        slug,
        expires_at: expires_at(now),
    })
}

/// Gate an access attempt. A missing candidate checks only the window; a
/// supplied candidate must also equal the active slug. Store errors deny
/// access rather than propagate: a respondent sees "denied", never a stack
/// trace.
pub fn check_access(db: &Database, candidate: Option<&str>, now: DateTime<Utc>) -> PortalStatus {
    let config = match db.get_portal_config() {
        Ok(Some(config)) => config,
        Ok(None) => return PortalStatus::denied(),
        Err(e) => {
            warn!("Portal config read failed, denying access: {}", e);
            return PortalStatus::denied();
        }
    };

    let created_at = config.created_at_utc();
    let slug_matches = candidate.is_none_or(|c| c == config.slug);
    let within_window = now - created_at <= expiry_window();

    PortalStatus {
        allowed: slug_matches && within_window,
        slug: Some(config.slug),
        expires_at: Some(expires_at(created_at)),
    }
}

#[derive(Debug, Deserialize)]
pub struct PortalQuery {
    pub slug: Option<String>,
}

/// GET /portal
pub async fn check_portal(
    State(state): State<AppState>,
    Query(query): Query<PortalQuery>,
) -> Result<Json<PortalStatus>, ApiError> {
    let status =
        task::spawn_blocking(move || check_access(&state.db, query.slug.as_deref(), Utc::now()))
            .await
            .map_err(ApiError::join)?;
    Ok(Json(status))
}

/// POST /admin/portal/rotate
pub async fn rotate_portal(
    State(state): State<AppState>,
) -> Result<Json<RotatePortalResponse>, ApiError> {
    let response = task::spawn_blocking(move || rotate(&state.db, Utc::now()))
        .await
        .map_err(ApiError::join)?
        .map_err(|e| ApiError::Upstream(format!("portal rotation failed: {e}")))?;
    Ok(Json(response))
}
