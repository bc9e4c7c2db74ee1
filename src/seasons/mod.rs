//! Resolution of the authoritative season list.
//!
//! The list comes from another Lambda function, wrapped twice: the invoke
//! payload is a JSON envelope, and the envelope's `body` is a JSON string
//! holding the actual array. Each layer is decoded separately so a failure
//! can be pinned to the stage that produced it.

pub mod invoker;
pub mod types;

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use invoker::{FunctionInvoker, LambdaInvoker, PreparsedInvoker};
pub use types::{InvocationResult, LambdaEnvelope, ResolveError, SeasonId, SeasonList};

pub const DEFAULT_SEASONS_FUNCTION: &str = "GetNHLSeasonsLambda";

const EMPTY_REQUEST: &[u8] = b"{}";

pub struct SeasonListResolver {
    invoker: Arc<dyn FunctionInvoker>,
    function_name: String,
}

impl SeasonListResolver {
    #[must_use]
    pub fn new(invoker: Arc<dyn FunctionInvoker>, function_name: impl Into<String>) -> Self {
        Self {
            invoker,
            function_name: function_name.into(),
        }
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Call the season-list function with an empty request and wait for it.
    pub async fn invoke(&self) -> InvocationResult {
        info!(function = %self.function_name, "invoking season list function");
        let result = self.invoker.invoke(&self.function_name, EMPTY_REQUEST).await;
        if let InvocationResult::Failed { code, message } = &result {
            error!(
                function = %self.function_name,
                %code,
                %message,
                "error invoking season list function"
            );
        }
        result
    }

    /// Run every stage, stopping at the first one that fails.
    ///
    /// # Errors
    ///
    /// Returns the [`ResolveError`] of the stage that failed.
    pub async fn resolve(&self) -> Result<SeasonList, ResolveError> {
        let result = self.invoke().await;
        let envelope = unwrap_envelope(result)?;
        extract_season_list(&envelope)
    }

    /// [`Self::resolve`] without the failure reason.
    pub async fn resolve_seasons(&self) -> Option<SeasonList> {
        self.resolve().await.ok()
    }
}

/// Decode the invoke payload into the function's response envelope.
///
/// When the function crashed, its fault descriptor is returned in place of
/// an envelope; [`extract_season_list`] recognises and rejects it.
///
/// # Errors
///
/// Returns an error for transport failures, a missing payload, bytes that
/// are not UTF-8 JSON objects, or an unparsable fault payload.
pub fn unwrap_envelope(result: InvocationResult) -> Result<LambdaEnvelope, ResolveError> {
    match result {
        InvocationResult::Failed { code, message } => {
            warn!(%code, %message, "skipping payload parsing due to invocation error");
            Err(ResolveError::Transport { code, message })
        }
        InvocationResult::Completed { payload: None, .. } => {
            error!("invocation response has no readable payload");
            Err(ResolveError::MissingPayload)
        }
        InvocationResult::Completed {
            payload: Some(bytes),
            function_error,
        } => {
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    let raw = String::from_utf8_lossy(e.as_bytes()).into_owned();
                    error!(error = %e, payload = %raw, "invocation payload is not valid UTF-8");
                    return Err(ResolveError::Decode(e.to_string()));
                }
            };
            debug!(payload = %text, "invocation payload");

            if let Some(kind) = function_error {
                warn!(function_error = %kind, payload = %text, "invoked function reported a function error");
                return parse_envelope(&text).map_err(|e| {
                    error!(error = %e, "function error payload is not valid JSON");
                    ResolveError::RemoteFault {
                        error_type: kind,
                        message: text.clone(),
                    }
                });
            }

            parse_envelope(&text).map_err(|e| {
                error!(error = %e, payload = %text, "could not parse invocation payload as JSON");
                ResolveError::Decode(e)
            })
        }
        InvocationResult::Preparsed(value) => {
            warn!("no payload stream; treating the result as an already-parsed envelope");
            envelope_from_value(value).map_err(ResolveError::Decode)
        }
    }
}

/// Pull the season list out of the envelope's JSON-encoded `body`.
///
/// A 200 with no body is an empty list, not a failure.
///
/// # Errors
///
/// Returns an error for fault descriptors, any status other than 200, and
/// bodies that are not a JSON string holding an array of season ids.
pub fn extract_season_list(envelope: &LambdaEnvelope) -> Result<SeasonList, ResolveError> {
    if let Some((error_type, message)) = envelope.fault() {
        error!(%error_type, %message, "invoked function reported an unhandled error");
        return Err(ResolveError::RemoteFault {
            error_type,
            message,
        });
    }

    if !envelope.is_ok_status() {
        let status = envelope.status_text();
        error!(%status, "invoked function returned a non-200 status code");
        return Err(ResolveError::Status(status));
    }

    let body = match &envelope.body {
        None | Some(Value::Null) => {
            warn!("statusCode is 200 but body is missing or null");
            return Ok(Vec::new());
        }
        Some(Value::String(body)) => body,
        Some(other) => {
            error!(body = %other, "body is not a JSON-encoded string");
            return Err(ResolveError::Body(format!("expected a string, got {other}")));
        }
    };

    match serde_json::from_str::<SeasonList>(body) {
        Ok(seasons) => {
            info!(count = seasons.len(), "extracted seasons list from body");
            Ok(seasons)
        }
        Err(e) => {
            error!(error = %e, body = %body, "could not parse body content as JSON");
            Err(ResolveError::Body(e.to_string()))
        }
    }
}

fn parse_envelope(text: &str) -> Result<LambdaEnvelope, String> {
    let value = serde_json::from_str::<Value>(text).map_err(|e| e.to_string())?;
    envelope_from_value(value)
}

fn envelope_from_value(value: Value) -> Result<LambdaEnvelope, String> {
    if !value.is_object() {
        return Err(format!("expected a JSON object, got {value}"));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}
