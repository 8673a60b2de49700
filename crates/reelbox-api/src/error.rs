use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// Closed error taxonomy for every public operation. Callers match on the
/// kind; the HTTP mapping lives here and nowhere else.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Store credentials or bucket missing. Only the admin can fix this, so
    /// the message goes out verbatim.
    #[error("{0}")]
    Configuration(String),

    /// Caller is not the recognized admin. Always a generic denial.
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// The recording exists but its window has elapsed. Carries the display
    /// name only; the URL must stay unreachable.
    #[error("link expired")]
    Expired { name: String },

    #[error("{0}")]
    Validation(String),

    /// Object-store or record-store failure. Detail goes to the server log;
    /// the caller gets a generic message.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl ApiError {
    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        ApiError::Upstream(format!("blocking task join error: {e}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Configuration(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            ApiError::Expired { name } => (
                StatusCode::GONE,
                Json(json!({ "error": "LINK_EXPIRED", "data": { "name": name } })),
            )
                .into_response(),
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Upstream(detail) => {
                error!("Upstream failure: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Upstream service failed" })),
                )
                    .into_response()
            }
        }
    }
}
