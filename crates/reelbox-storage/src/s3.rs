//! S3-compatible object store client.
//!
//! Works against AWS S3, MinIO, Cloudflare R2 and anything else speaking the
//! S3 API. Presigned URLs are the only capability the rest of the system
//! ever hands to a browser; the server itself only issues signatures and
//! deletes.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use tracing::info;

use crate::ObjectStore;

pub struct S3ObjectStore {
    bucket: s3::Bucket,
    endpoint: String,
    bucket_name: String,
}

impl S3ObjectStore {
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket_name: &str,
    ) -> Result<Self> {
        let region = s3::Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials =
            s3::creds::Credentials::new(Some(access_key), Some(secret_key), None, None, None)?;

        let bucket = s3::Bucket::new(bucket_name, region, credentials)?.with_path_style();

        Ok(Self {
            bucket: *bucket,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket_name: bucket_name.to_string(),
        })
    }

    /// Build from `S3_ENDPOINT`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`,
    /// `S3_BUCKET` (all required) and `S3_REGION` (default `us-east-1`).
    ///
    /// The error message names the missing variable; it is surfaced to the
    /// admin, who is the only one who can fix it.
    pub fn from_env() -> Result<Self> {
        let endpoint = require_env("S3_ENDPOINT")?;
        let access_key = require_env("S3_ACCESS_KEY")?;
        let secret_key = require_env("S3_SECRET_KEY")?;
        let bucket_name = require_env("S3_BUCKET")?;
        let region = std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let store = Self::new(&endpoint, &region, &access_key, &secret_key, &bucket_name)
            .context("failed to initialise S3 bucket")?;

        info!(
            "Object storage configured: bucket '{}' at {}",
            store.bucket_name, store.endpoint
        );
        Ok(store)
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{} is not set", name))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, key: &str, ttl_secs: u32) -> Result<String> {
        let url = self
            .bucket
            .presign_put(key, ttl_secs, None, None)
            .await
            .with_context(|| format!("failed to presign PUT for '{}'", key))?;
        Ok(url)
    }

    async fn presign_get(&self, key: &str, ttl_secs: u32) -> Result<String> {
        let url = self
            .bucket
            .presign_get(key, ttl_secs, None)
            .await
            .with_context(|| format!("failed to presign GET for '{}'", key))?;
        Ok(url)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .with_context(|| format!("failed to delete object '{}'", key))?;

        let status = response.status_code();
        if status != 204 && status != 200 {
            bail!("object delete for '{}' returned HTTP {}", key, status);
        }
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        // Path-style, matching how the bucket itself is addressed.
        format!("{}/{}/{}", self.endpoint, self.bucket_name, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectStore;

    fn test_store() -> S3ObjectStore {
        S3ObjectStore::new(
            "http://localhost:9000",
            "us-east-1",
            "minioadmin",
            "minioadmin",
            "reelbox-test",
        )
        .unwrap()
    }

    #[test]
    fn object_url_is_canonical_and_unsigned() {
        let store = test_store();
        assert_eq!(
            store.object_url("recording-1-jane_doe.webm"),
            "http://localhost:9000/reelbox-test/recording-1-jane_doe.webm"
        );
    }

    #[tokio::test]
    async fn presigned_put_embeds_key_and_signature() {
        let store = test_store();
        let url = store
            .presign_put("recording-1-jane_doe.webm", 600)
            .await
            .unwrap();
        assert!(url.contains("recording-1-jane_doe.webm"));
        assert!(url.contains("X-Amz-Signature"));
    }

    #[test]
    fn missing_env_names_the_variable() {
        // Deliberately not set in the test environment.
        let err = require_env("REELBOX_TEST_UNSET_VAR").unwrap_err();
        assert_eq!(err.to_string(), "REELBOX_TEST_UNSET_VAR is not set");
    }
}
