//! Upload Handoff Protocol: presigned PUT issuance and the metadata commit.
//!
//! The video bytes never pass through this server. The browser asks for a
//! presigned target, PUTs straight to the object store, then calls back with
//! the key so the metadata row can be written. An upload that never calls
//! back leaves an orphaned object and no row; a row pointing at a missing
//! object cannot happen.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use tokio::task;

use reelbox_db::PORTAL_SENTINEL_NAME;
use reelbox_storage::{UPLOAD_URL_TTL_SECS, keys};
use reelbox_types::api::{CommitRecordingRequest, UploadTargetRequest, UploadTargetResponse};
use reelbox_types::models::Recording;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::recordings::to_recording;

pub(crate) async fn request_target(
    state: &AppState,
    req: UploadTargetRequest,
) -> Result<UploadTargetResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    if req.content_type.trim().is_empty() {
        return Err(ApiError::Validation("content_type is required".to_string()));
    }

    let store = state.object_store()?;
    let now = Utc::now();
    let object_key = keys::derive_object_key(&req.name, &req.content_type, now);

    let put_url = store
        .presign_put(&object_key, UPLOAD_URL_TTL_SECS)
        .await
        .map_err(|e| ApiError::Upstream(format!("upload presign failed: {e}")))?;

    Ok(UploadTargetResponse {
        put_url,
        object_key,
        expires_at: now + Duration::seconds(UPLOAD_URL_TTL_SECS as i64),
    })
}

pub(crate) async fn commit(
    state: &AppState,
    req: CommitRecordingRequest,
) -> Result<Recording, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    // The sentinel name is what keeps the portal row unmistakable.
    if req.name == PORTAL_SENTINEL_NAME {
        return Err(ApiError::Validation("name is reserved".to_string()));
    }
    if !keys::is_valid_object_key(&req.object_key) {
        return Err(ApiError::Validation(
            "object_key is not a key this server issued".to_string(),
        ));
    }

    let store = state.object_store()?;
    let url = store.object_url(&req.object_key);
    let now = Utc::now();

    // The raw name goes into the row for display; only the object key ever
    // used the sanitized form.
    let db = state.clone();
    let row = task::spawn_blocking(move || db.db.insert_recording(&req.name, &url, now))
        .await
        .map_err(ApiError::join)?
        .map_err(|e| ApiError::Upstream(format!("metadata insert failed: {e}")))?;

    Ok(to_recording(row, now))
}

// -- Handlers --

/// POST /uploads
pub async fn request_upload_target(
    State(state): State<AppState>,
    Json(req): Json<UploadTargetRequest>,
) -> Result<Json<UploadTargetResponse>, ApiError> {
    request_target(&state, req).await.map(Json)
}

/// POST /recordings
pub async fn commit_metadata(
    State(state): State<AppState>,
    Json(req): Json<CommitRecordingRequest>,
) -> Result<(StatusCode, Json<Recording>), ApiError> {
    let recording = commit(&state, req).await?;
    Ok((StatusCode::CREATED, Json(recording)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockStore, test_state, test_state_without_store};
    use std::sync::Arc;

    fn target_request(name: &str, content_type: &str) -> UploadTargetRequest {
        UploadTargetRequest {
            name: name.to_string(),
            content_type: content_type.to_string(),
        }
    }

    #[tokio::test]
    async fn target_key_embeds_timestamp_and_sanitized_name() {
        let state = test_state(Arc::new(MockStore::new()));
        let before = Utc::now();

        let target = request_target(&state, target_request("Jane Doe", "video/webm"))
            .await
            .unwrap();

        assert!(target.object_key.starts_with("recording-"));
        assert!(target.object_key.ends_with("-jane_doe.webm"));
        assert!(keys::is_valid_object_key(&target.object_key));
        assert!(target.put_url.contains(&target.object_key));
        assert!(target.expires_at >= before + Duration::seconds(UPLOAD_URL_TTL_SECS as i64));
    }

    #[tokio::test]
    async fn missing_content_type_is_a_validation_error() {
        let state = test_state(Arc::new(MockStore::new()));
        let err = request_target(&state, target_request("Jane Doe", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unconfigured_store_is_a_configuration_error() {
        let state = test_state_without_store();
        let err = request_target(&state, target_request("Jane Doe", "video/webm"))
            .await
            .unwrap_err();
        match err {
            ApiError::Configuration(message) => assert!(message.contains("S3_ENDPOINT")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commit_stores_a_url_embedding_the_exact_key() {
        let state = test_state(Arc::new(MockStore::new()));

        let recording = commit(
            &state,
            CommitRecordingRequest {
                name: "Jane Doe".to_string(),
                object_key: "recording-1700000000000-jane_doe.webm".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(recording.name, "Jane Doe");
        assert_eq!(
            recording.url,
            "http://store.example/bucket/recording-1700000000000-jane_doe.webm"
        );
        assert!(!recording.is_expired);

        let rows = state.db.list_recordings().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].url, recording.url);
    }

    #[tokio::test]
    async fn commit_rejects_the_sentinel_name() {
        let state = test_state(Arc::new(MockStore::new()));
        let err = commit(
            &state,
            CommitRecordingRequest {
                name: PORTAL_SENTINEL_NAME.to_string(),
                object_key: "recording-1-x.webm".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(state.db.list_recordings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_rejects_keys_this_server_never_issued() {
        let state = test_state(Arc::new(MockStore::new()));
        let err = commit(
            &state,
            CommitRecordingRequest {
                name: "Jane Doe".to_string(),
                object_key: "../other-bucket/escape.webm".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
