use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;
use tracing::debug;

use super::{BlobStore, StorageError};
use crate::aws::RequestSigner;

#[derive(Clone, Debug)]
pub struct S3StorageConfig {
    pub endpoint: String,
    pub bucket: String,
}

/// Path-style `PUT` against S3 or any S3-compatible endpoint.
#[derive(Clone)]
pub struct S3BlobStore {
    client: reqwest::Client,
    config: S3StorageConfig,
    signer: Arc<dyn RequestSigner>,
}

impl S3BlobStore {
    #[must_use]
    pub fn new(config: S3StorageConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            signer,
        }
    }

    fn object_url(&self, key: &str) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        let bucket = self.config.bucket.trim_matches('/');
        format!("{base}/{bucket}/{key}")
    }
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.object_url(key);
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .map_err(|e| StorageError::new(format!("invalid content type: {e}")))?,
        );
        let headers = self
            .signer
            .sign("PUT", &url, headers, Some(&body))
            .map_err(|e| StorageError::new(e.to_string()))?;

        debug!(%url, bytes = body.len(), "putting object");
        let resp = self
            .client
            .put(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(StorageError::new(format!(
                "S3 PUT failed with status {status}: {detail}"
            )));
        }

        Ok(())
    }
}
