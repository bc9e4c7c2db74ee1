use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::types::InvocationResult;
use crate::aws::RequestSigner;
use crate::error::CoreError;

const INVOCATION_TYPE: &str = "x-amz-invocation-type";
const FUNCTION_ERROR: &str = "x-amz-function-error";
const ERROR_TYPE: &str = "x-amzn-errortype";

/// Synchronous (request/response) invocation of a named remote function.
///
/// Implementations never fail: anything that keeps the call from reaching
/// the function comes back as [`InvocationResult::Failed`].
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(&self, function_name: &str, payload: &[u8]) -> InvocationResult;
}

/// Calls the Lambda `Invoke` REST API with a signed request.
pub struct LambdaInvoker {
    client: reqwest::Client,
    endpoint: String,
    signer: Arc<dyn RequestSigner>,
}

impl LambdaInvoker {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            signer,
        }
    }

    fn invoke_url(&self, function_name: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!("{base}/2015-03-31/functions/{function_name}/invocations")
    }

    async fn try_invoke(
        &self,
        function_name: &str,
        payload: &[u8],
    ) -> Result<InvocationResult, CoreError> {
        let url = self.invoke_url(function_name);
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(INVOCATION_TYPE),
            HeaderValue::from_static("RequestResponse"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let headers = self.signer.sign("POST", &url, headers, Some(payload))?;

        let resp = self
            .client
            .post(url)
            .headers(headers)
            .body(payload.to_vec())
            .send()
            .await?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await?;
        debug!(status, bytes = bytes.len(), "invoke response received");

        Ok(response_to_result(status, &headers, &bytes))
    }
}

#[async_trait]
impl FunctionInvoker for LambdaInvoker {
    async fn invoke(&self, function_name: &str, payload: &[u8]) -> InvocationResult {
        match self.try_invoke(function_name, payload).await {
            Ok(result) => result,
            Err(e) => InvocationResult::failed("UnexpectedError", e.to_string()),
        }
    }
}

/// Hands back a fixed envelope without any network call.
pub struct PreparsedInvoker {
    envelope: Value,
}

impl PreparsedInvoker {
    #[must_use]
    pub fn new(envelope: Value) -> Self {
        Self { envelope }
    }
}

#[async_trait]
impl FunctionInvoker for PreparsedInvoker {
    async fn invoke(&self, function_name: &str, _payload: &[u8]) -> InvocationResult {
        debug!(function = %function_name, "using preparsed envelope");
        InvocationResult::Preparsed(self.envelope.clone())
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Map an invoke API reply to an [`InvocationResult`]. A 2xx reply carrying
/// `X-Amz-Function-Error` means the function ran and crashed.
pub(crate) fn response_to_result(status: u16, headers: &HeaderMap, body: &[u8]) -> InvocationResult {
    if !(200..300).contains(&status) {
        return failure_from_response(status, header_text(headers, ERROR_TYPE).as_deref(), body);
    }

    InvocationResult::Completed {
        payload: Some(body.to_vec()),
        function_error: header_text(headers, FUNCTION_ERROR),
    }
}

/// Map a non-2xx reply from the invoke API to an error code and message.
pub(crate) fn failure_from_response(
    status: u16,
    error_type: Option<&str>,
    body: &[u8],
) -> InvocationResult {
    let text = String::from_utf8_lossy(body).into_owned();
    let json = serde_json::from_str::<Value>(&text).ok();
    let field = |names: &[&str]| {
        let json = json.as_ref()?;
        names
            .iter()
            .find_map(|name| json.get(*name).and_then(Value::as_str))
            .map(str::to_string)
    };

    // the header looks like `AccessDeniedException:http://internal.amazon.com/...`
    let code = error_type
        .and_then(|t| t.split(':').next())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| field(&["__type", "Type"]))
        .unwrap_or_else(|| format!("HTTP{status}"));
    let message = field(&["message", "Message"]).unwrap_or(text);

    InvocationResult::failed(code, message)
}
