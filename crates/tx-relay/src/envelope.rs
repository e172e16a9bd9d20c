use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FailureKind, RelayError};

/// Uniform result of every pipeline operation.
///
/// `status` is 1 on success with `message` holding the hash or transaction
/// info, and 0 on failure with `message` holding the diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status: u8,
    pub message: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl Envelope {
    pub const SUCCESS: u8 = 1;
    pub const FAILURE: u8 = 0;

    pub fn success(message: impl Into<Value>) -> Self {
        Self {
            status: Self::SUCCESS,
            message: message.into(),
            function_name: None,
            kind: None,
        }
    }

    pub fn failure(err: &RelayError) -> Self {
        Self {
            status: Self::FAILURE,
            message: Value::String(err.to_string()),
            function_name: None,
            kind: Some(err.kind()),
        }
    }

    pub fn from_result<T: Into<Value>>(result: Result<T, RelayError>) -> Self {
        match result {
            Ok(message) => Self::success(message),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

impl From<RelayError> for Envelope {
    fn from(err: RelayError) -> Self {
        Self::failure(&err)
    }
}
