use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

// -- Portal --

#[derive(Debug, Serialize)]
pub struct RotatePortalResponse {
    pub slug: String,
    pub expires_at: DateTime<Utc>,
}

// -- Uploads --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadTargetRequest {
    pub name: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct UploadTargetResponse {
    pub put_url: String,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitRecordingRequest {
    pub name: String,
    pub object_key: String,
}
