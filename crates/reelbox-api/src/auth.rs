use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use reelbox_db::Database;
use reelbox_storage::ObjectStore;
use reelbox_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::middleware::Claims;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// None when the S3 environment is incomplete; operations that need the
    /// store surface that as a configuration error.
    pub store: Option<Arc<dyn ObjectStore>>,
    pub jwt_secret: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AppStateInner {
    pub fn object_store(&self) -> Result<&Arc<dyn ObjectStore>, ApiError> {
        self.store.as_ref().ok_or_else(|| {
            ApiError::Configuration(
                "object storage is not configured \
                 (set S3_ENDPOINT, S3_ACCESS_KEY, S3_SECRET_KEY, S3_BUCKET)"
                    .to_string(),
            )
        })
    }
}

/// POST /auth/login — single-admin credential check against the configured
/// values. A mismatch is a generic denial; nothing leaks about which field
/// was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (&state.admin_email, &state.admin_password) else {
        // No credentials configured means nobody can log in.
        return Err(ApiError::Unauthorized);
    };

    if req.email != *email || req.password != *password {
        return Err(ApiError::Unauthorized);
    }

    let token = create_token(&state.jwt_secret)
        .map_err(|e| ApiError::Upstream(format!("token issuance failed: {e}")))?;

    Ok(Json(LoginResponse { token }))
}

fn create_token(secret: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: "admin".to_string(),
        exp: (Utc::now() + Duration::hours(24)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
