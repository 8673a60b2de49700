pub mod keys;
pub mod s3;

use anyhow::Result;
use async_trait::async_trait;

pub use s3::S3ObjectStore;

/// One upload attempt's worth of validity (minutes, not hours) to limit
/// replay of a leaked PUT URL.
pub const UPLOAD_URL_TTL_SECS: u32 = 600;

/// Per-request view capability. Much shorter than the 7-day business window;
/// the stored URL is a location, not a capability.
pub const VIEW_URL_TTL_SECS: u32 = 3600;

/// Time-limited capability URLs and direct deletes against a single bucket.
///
/// The S3-compatible implementation lives in the `s3` module; tests
/// substitute their own.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn presign_put(&self, key: &str, ttl_secs: u32) -> Result<String>;

    async fn presign_get(&self, key: &str, ttl_secs: u32) -> Result<String>;

    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Canonical, unsigned location of an object. This is what gets stored
    /// in a recording row.
    fn object_url(&self, key: &str) -> String;
}
