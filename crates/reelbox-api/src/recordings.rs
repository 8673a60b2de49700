//! Recording Lifecycle Manager: the authoritative list of submitted
//! recordings and their expiry/renewal state.
//!
//! Multi-step operations are not transactional across the two stores. The
//! ordering rules bias every partial failure toward "extra or orphaned
//! object" and away from "dangling reference": renew inserts before it
//! deletes, delete removes the object before the row.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use tokio::task;
use tracing::warn;
use uuid::Uuid;

use reelbox_db::models::RecordingRow;
use reelbox_storage::{VIEW_URL_TTL_SECS, keys};
use reelbox_types::models::{Recording, is_expired};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Claims;

pub(crate) fn to_recording(row: RecordingRow, now: DateTime<Utc>) -> Recording {
    let created_at = row.created_at_utc();
    Recording {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt recording id '{}': {}", row.id, e);
            Uuid::nil()
        }),
        name: row.name,
        url: row.url,
        created_at,
        is_expired: is_expired(created_at, now),
    }
}

pub(crate) async fn list_all(state: &AppState, now: DateTime<Utc>) -> Result<Vec<Recording>, ApiError> {
    let db = state.clone();
    let rows = task::spawn_blocking(move || db.db.list_recordings())
        .await
        .map_err(ApiError::join)?
        .map_err(|e| ApiError::Upstream(format!("recording list failed: {e}")))?;

    Ok(rows.into_iter().map(|row| to_recording(row, now)).collect())
}

/// Single-recording fetch. The stored URL is a location, not a capability:
/// a fresh short-lived view URL is minted per request, and an expired
/// recording yields only its name, never anything dereferenceable.
pub(crate) async fn fetch(
    state: &AppState,
    id: String,
    now: DateTime<Utc>,
) -> Result<Recording, ApiError> {
    let db = state.clone();
    let lookup = id.clone();
    let row = task::spawn_blocking(move || db.db.get_recording(&lookup))
        .await
        .map_err(ApiError::join)?
        .map_err(|e| ApiError::Upstream(format!("recording fetch failed: {e}")))?
        .ok_or(ApiError::NotFound)?;

    if is_expired(row.created_at_utc(), now) {
        return Err(ApiError::Expired { name: row.name });
    }

    let store = state.object_store()?;
    let key = keys::object_key_from_url(&row.url).ok_or_else(|| {
        ApiError::Upstream(format!("stored url '{}' has no object key", row.url))
    })?;
    let view_url = store
        .presign_get(&key, VIEW_URL_TTL_SECS)
        .await
        .map_err(|e| ApiError::Upstream(format!("view presign for recording {id} failed: {e}")))?;

    let mut recording = to_recording(row, now);
    recording.url = view_url;
    Ok(recording)
}

/// Mint a new 7-day window over the same underlying object. Insert before
/// delete: a failure after the insert leaves a harmless duplicate instead of
/// losing the recording, and a stale-row delete failure is logged and
/// swallowed because the renewal itself already succeeded.
pub(crate) async fn renew(
    state: &AppState,
    id: String,
    now: DateTime<Utc>,
) -> Result<Recording, ApiError> {
    let db = state.clone();
    let fresh = task::spawn_blocking(move || -> Result<RecordingRow, ApiError> {
        let row = db
            .db
            .get_recording(&id)
            .map_err(|e| ApiError::Upstream(format!("recording fetch failed: {e}")))?
            .ok_or(ApiError::NotFound)?;

        let canonical = keys::strip_signing_params(&row.url);
        let fresh = db
            .db
            .insert_recording(&row.name, canonical, now)
            .map_err(|e| ApiError::Upstream(format!("renewal insert failed: {e}")))?;

        if let Err(e) = db.db.delete_recording(&row.id) {
            warn!(
                "Renew {}: stale row delete failed, duplicate left behind: {}",
                row.id, e
            );
        }

        Ok(fresh)
    })
    .await
    .map_err(ApiError::join)??;

    Ok(to_recording(fresh, now))
}

/// Remove a recording and its object. The object goes first: if that fails
/// the row stays and the operation fails, so a reported deletion never
/// leaves a reachable object. The reverse residue (object gone, row delete
/// failed) is the accepted orphan direction.
pub(crate) async fn remove(state: &AppState, id: String) -> Result<(), ApiError> {
    let db = state.clone();
    let lookup = id.clone();
    let row = task::spawn_blocking(move || db.db.get_recording(&lookup))
        .await
        .map_err(ApiError::join)?
        .map_err(|e| ApiError::Upstream(format!("recording fetch failed: {e}")))?
        .ok_or(ApiError::NotFound)?;

    let store = state.object_store()?;
    let key = keys::object_key_from_url(&row.url).ok_or_else(|| {
        ApiError::Upstream(format!("stored url '{}' has no object key", row.url))
    })?;

    store.delete_object(&key).await.map_err(|e| {
        ApiError::Upstream(format!(
            "object delete for recording {id} failed, row kept: {e}"
        ))
    })?;

    let db = state.clone();
    let lookup = id.clone();
    let removed = task::spawn_blocking(move || db.db.delete_recording(&lookup))
        .await
        .map_err(ApiError::join)?
        .map_err(|e| {
            ApiError::Upstream(format!(
                "row delete for recording {id} failed after object delete: {e}"
            ))
        })?;

    if !removed {
        warn!("Delete {}: row already gone", id);
    }
    Ok(())
}

// -- Handlers --

/// GET /admin/recordings
pub async fn list_recordings(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<Recording>>, ApiError> {
    list_all(&state, Utc::now()).await.map(Json)
}

/// GET /recordings/{id}
pub async fn get_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recording>, ApiError> {
    fetch(&state, id, Utc::now()).await.map(Json)
}

/// POST /admin/recordings/{id}/renew
pub async fn renew_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Recording>, ApiError> {
    renew(&state, id, Utc::now()).await.map(Json)
}

/// DELETE /admin/recordings/{id}
pub async fn delete_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    remove(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
