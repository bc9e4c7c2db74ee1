use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::info;

pub mod keys;
pub mod s3;

pub use keys::bios_key;
pub use s3::{S3BlobStore, S3StorageConfig};

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

/// Write-only object sink.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Accepts every object and only logs it. Used for `--dry-run`.
#[derive(Debug, Default, Clone)]
pub struct DiscardStore;

#[async_trait]
impl BlobStore for DiscardStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        info!(key, bytes = body.len(), content_type, "dry run, not uploading");
        Ok(())
    }
}
