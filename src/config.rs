use std::sync::Arc;

use crate::aws::{AwsCredentials, SigV4Signer};
use crate::error::CoreError;
use crate::nhl::Position;
use crate::seasons::{DEFAULT_SEASONS_FUNCTION, LambdaInvoker};
use crate::storage::keys::DEFAULT_PREFIX;
use crate::storage::{S3BlobStore, S3StorageConfig};

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub bucket: Option<String>,
    pub prefix: String,
    pub seasons_function: String,
    pub region: String,
    pub s3_endpoint: String,
    pub lambda_endpoint: String,
    pub credentials: AwsCredentials,
    pub positions: Vec<Position>,
}

impl IngestConfig {
    /// Build config from `.env` and process environment variables.
    ///
    /// Required:
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
    ///
    /// Optional:
    /// - `NHL_BIOS_BUCKET` (only needed to build the blob store)
    /// - `NHL_BIOS_PREFIX` (defaults to `nhl-player-bios`)
    /// - `SEASONS_FUNCTION_NAME` (defaults to `GetNHLSeasonsLambda`)
    /// - `AWS_REGION` or `AWS_DEFAULT_REGION` (defaults to `us-east-1`)
    /// - `S3_ENDPOINT`, `LAMBDA_ENDPOINT` (default to the regional AWS endpoints)
    /// - `AWS_SESSION_TOKEN`
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`Self::from_env`], with `overrides` taking precedence when set.
    ///
    /// # Errors
    /// Returns an error if required values are missing from both.
    pub fn from_env_with(overrides: &[(&str, Option<String>)]) -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| {
            overrides
                .iter()
                .find(|(key, value)| *key == name && value.is_some())
                .and_then(|(_, value)| value.clone())
                .or_else(|| std::env::var(name).ok())
        })
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    /// Returns an error if required variables are missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| CoreError::Config(format!("missing {name}")))
        };

        let access_key_id = required("AWS_ACCESS_KEY_ID")?;
        let secret_access_key = required("AWS_SECRET_ACCESS_KEY")?;
        let region = var("AWS_REGION")
            .or_else(|| var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            bucket: var("NHL_BIOS_BUCKET"),
            prefix: var("NHL_BIOS_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            seasons_function: var("SEASONS_FUNCTION_NAME")
                .unwrap_or_else(|| DEFAULT_SEASONS_FUNCTION.to_string()),
            s3_endpoint: var("S3_ENDPOINT")
                .unwrap_or_else(|| format!("https://s3.{region}.amazonaws.com")),
            lambda_endpoint: var("LAMBDA_ENDPOINT")
                .unwrap_or_else(|| format!("https://lambda.{region}.amazonaws.com")),
            region,
            credentials: AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: var("AWS_SESSION_TOKEN"),
            },
            positions: Position::ALL.to_vec(),
        })
    }

    #[must_use]
    pub fn signer(&self, service: &str) -> SigV4Signer {
        SigV4Signer::new(self.credentials.clone(), self.region.clone(), service)
    }

    #[must_use]
    pub fn lambda_invoker(&self) -> LambdaInvoker {
        LambdaInvoker::new(self.lambda_endpoint.clone(), Arc::new(self.signer("lambda")))
    }

    /// # Errors
    /// Returns an error if no bucket is configured.
    pub fn blob_store(&self) -> Result<S3BlobStore, CoreError> {
        let bucket = self
            .bucket
            .clone()
            .ok_or_else(|| CoreError::Config("missing NHL_BIOS_BUCKET".to_string()))?;
        Ok(S3BlobStore::new(
            S3StorageConfig {
                endpoint: self.s3_endpoint.clone(),
                bucket,
            },
            Arc::new(self.signer("s3")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = IngestConfig::from_lookup(lookup(&[
            ("NHL_BIOS_BUCKET", "your-nhl-data-bucket"),
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_DEFAULT_REGION", "ca-central-1"),
        ]))
        .unwrap();

        assert_eq!(config.prefix, "nhl-player-bios");
        assert_eq!(config.seasons_function, "GetNHLSeasonsLambda");
        assert_eq!(config.region, "ca-central-1");
        assert_eq!(config.s3_endpoint, "https://s3.ca-central-1.amazonaws.com");
        assert_eq!(config.lambda_endpoint, "https://lambda.ca-central-1.amazonaws.com");
        assert!(config.credentials.session_token.is_none());
        assert_eq!(config.positions, vec![Position::Skater, Position::Goalie]);
    }

    #[test]
    fn missing_bucket_only_blocks_the_blob_store() {
        let config = IngestConfig::from_lookup(lookup(&[
            ("NHL_BIOS_BUCKET", "  "),
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap();
        assert!(config.bucket.is_none());
        let err = config.blob_store().err().unwrap();
        assert_eq!(err.to_string(), "config error: missing NHL_BIOS_BUCKET");
    }

    #[test]
    fn missing_credentials_are_an_error() {
        let err = IngestConfig::from_lookup(lookup(&[("AWS_ACCESS_KEY_ID", "AKID")])).unwrap_err();
        assert_eq!(err.to_string(), "config error: missing AWS_SECRET_ACCESS_KEY");
    }

    #[test]
    fn overrides_are_respected() {
        let config = IngestConfig::from_lookup(lookup(&[
            ("NHL_BIOS_BUCKET", "b"),
            ("NHL_BIOS_PREFIX", "raw"),
            ("SEASONS_FUNCTION_NAME", "ListSeasons"),
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "tok"),
            ("AWS_REGION", "us-west-2"),
            ("AWS_DEFAULT_REGION", "ca-central-1"),
            ("S3_ENDPOINT", "http://localhost:9000"),
        ]))
        .unwrap();

        assert_eq!(config.prefix, "raw");
        assert_eq!(config.seasons_function, "ListSeasons");
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.s3_endpoint, "http://localhost:9000");
        assert_eq!(config.credentials.session_token.as_deref(), Some("tok"));
        assert_eq!(config.bucket.as_deref(), Some("b"));
        assert!(config.blob_store().is_ok());
    }
}
