use aws_sign_v4::AwsSign;
use chrono::Utc;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha256::digest as sha256_digest;

use super::AwsCredentials;
use crate::error::CoreError;

pub trait RequestSigner: Send + Sync {
    /// Sign a request and return the headers to attach.
    ///
    /// # Errors
    /// Returns an error if the request cannot be signed.
    fn sign(
        &self,
        method: &str,
        url: &str,
        headers: HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<HeaderMap, CoreError>;
}

/// Signature V4 signer bound to one region and service (`lambda`, `s3`).
#[derive(Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    #[must_use]
    pub fn new(credentials: AwsCredentials, region: String, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region,
            service: service.into(),
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, CoreError> {
    HeaderValue::from_str(value).map_err(|e| CoreError::Signing(format!("invalid {name}: {e}")))
}

impl RequestSigner for SigV4Signer {
    fn sign(
        &self,
        method: &str,
        url: &str,
        mut headers: HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<HeaderMap, CoreError> {
        let body = body.unwrap_or(&[]);
        let url = Url::parse(url).map_err(|e| CoreError::Signing(format!("invalid url: {e}")))?;

        let host = url
            .host_str()
            .ok_or_else(|| CoreError::Signing("missing host in url".to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sha256_digest(body);

        headers.insert(HeaderName::from_static("host"), header_value("host header", &host)?);
        headers.insert(
            HeaderName::from_static("x-amz-date"),
            header_value("x-amz-date", &amz_date)?,
        );
        headers.insert(
            HeaderName::from_static("x-amz-content-sha256"),
            header_value("x-amz-content-sha256", &payload_hash)?,
        );
        if let Some(token) = &self.credentials.session_token {
            headers.insert(
                HeaderName::from_static("x-amz-security-token"),
                header_value("x-amz-security-token", token)?,
            );
        }

        let signer = AwsSign::new(
            method,
            url.as_str(),
            &now,
            &headers,
            &self.region,
            &self.credentials.access_key_id,
            &self.credentials.secret_access_key,
            &self.service,
            body,
        );
        let auth_header = signer.sign();
        headers.insert(
            HeaderName::from_static("authorization"),
            header_value("authorization", &auth_header)?,
        );

        Ok(headers)
    }
}
