//! The `{success, result, error_code, msg}` wrapper around every JSON reply.

use serde::Deserialize;

/// Error code the appliance uses for an unknown object id.
pub const ERROR_INVALID_ID: &str = "invalid_id";

/// Standard Freebox API response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    /// Absent on errors, and on some list endpoints when the list is empty.
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Whether the appliance reported an unknown id.
    pub fn is_invalid_id(&self) -> bool {
        !self.success && self.error_code.as_deref() == Some(ERROR_INVALID_ID)
    }

    /// Human-readable description of a failed envelope.
    pub fn describe_error(&self) -> String {
        match (&self.error_code, &self.msg) {
            (Some(code), Some(msg)) => format!("{}: {}", code, msg),
            (Some(code), None) => code.clone(),
            (None, Some(msg)) => msg.clone(),
            (None, None) => "request failed without an error code".to_string(),
        }
    }
}
