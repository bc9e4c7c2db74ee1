use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::utils::is_truthy;

/// Outcome of one call to the season-list function.
#[derive(Debug, Clone)]
pub enum InvocationResult {
    /// The transport delivered a response. `function_error` is set when the
    /// invoked function itself raised an unhandled fault.
    Completed {
        payload: Option<Vec<u8>>,
        function_error: Option<String>,
    },
    /// The call never reached the function.
    Failed { code: String, message: String },
    /// An envelope supplied directly, with no payload stream to read.
    Preparsed(Value),
}

impl InvocationResult {
    #[must_use]
    pub fn completed(payload: impl Into<Vec<u8>>) -> Self {
        Self::Completed {
            payload: Some(payload.into()),
            function_error: None,
        }
    }

    #[must_use]
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The invoked function's response object, or a fault descriptor when the
/// function crashed. `body` is a JSON document encoded as a string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LambdaEnvelope {
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<Value>,
    #[serde(default)]
    pub headers: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<Value>,
    #[serde(rename = "errorType", default)]
    pub error_type: Option<Value>,
}

impl LambdaEnvelope {
    /// Both `errorMessage` and `errorType` are present and truthy.
    #[must_use]
    pub fn fault(&self) -> Option<(String, String)> {
        let error_type = truthy_text(self.error_type.as_ref())?;
        let message = truthy_text(self.error_message.as_ref())?;
        Some((error_type, message))
    }

    #[must_use]
    pub fn is_ok_status(&self) -> bool {
        self.status_code
            .as_ref()
            .and_then(Value::as_f64)
            .is_some_and(|code| code == 200.0)
    }

    #[must_use]
    pub fn status_text(&self) -> String {
        match &self.status_code {
            Some(code) => code.to_string(),
            None => "missing".to_string(),
        }
    }
}

fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value.filter(|v| is_truthy(v))? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonId(pub u32);

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SeasonId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

pub type SeasonList = Vec<SeasonId>;

/// Why a season list could not be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("invocation failed: {code} - {message}")]
    Transport { code: String, message: String },
    #[error("invocation response has no readable payload")]
    MissingPayload,
    #[error("could not decode invocation payload: {0}")]
    Decode(String),
    #[error("invoked function reported an unhandled error: {error_type} - {message}")]
    RemoteFault { error_type: String, message: String },
    #[error("invoked function returned status {0}")]
    Status(String),
    #[error("could not decode season list body: {0}")]
    Body(String),
}
