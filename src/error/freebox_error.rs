//! The crate-wide error type.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::{CredentialsError, HttpError};

/// Errors raised while talking to the appliance or managing watchers.
#[derive(Debug, Error)]
pub enum FreeboxError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// The response body could not be decoded.
    #[error("malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// The pairing token is missing, invalid or revoked. Pairing is required.
    #[error("application is not authorized on the Freebox")]
    NotAuthorized,

    /// Unexpected status code or error payload.
    #[error("unexpected response from {endpoint} (HTTP {status}): {message}")]
    Protocol {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// A request was still rejected after the session was refreshed.
    #[error("session rejected by {endpoint} even after re-login (HTTP {status})")]
    SessionRejected { endpoint: String, status: u16 },

    /// Another live client already uses this application id.
    #[error("an instance for application id '{app_id}' already exists")]
    DuplicateInstance { app_id: String },

    /// Pairing token storage failed.
    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A watcher was created outside of a tokio runtime.
    #[error("no tokio runtime available to run the poll task")]
    NoRuntime,

    #[error("configuration error: {0}")]
    Config(String),
}

impl FreeboxError {
    pub(crate) fn malformed(endpoint: &str, message: impl ToString) -> Self {
        FreeboxError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn protocol(endpoint: &str, status: u16, message: impl ToString) -> Self {
        FreeboxError::Protocol {
            endpoint: endpoint.to_string(),
            status,
            message: message.to_string(),
        }
    }

    /// High-level category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FreeboxError::Transport(_) | FreeboxError::MalformedResponse { .. } => {
                ErrorCategory::Network
            }
            FreeboxError::NotAuthorized | FreeboxError::SessionRejected { .. } => {
                ErrorCategory::Auth
            }
            FreeboxError::Protocol { .. } => ErrorCategory::Server,
            FreeboxError::DuplicateInstance { .. } | FreeboxError::NoRuntime => {
                ErrorCategory::Client
            }
            FreeboxError::Credentials(_) | FreeboxError::Io(_) => ErrorCategory::System,
            FreeboxError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether the failed operation is worth retrying as-is.
    pub fn is_transient(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether recovering requires pairing with the appliance again.
    pub fn requires_pairing(&self) -> bool {
        matches!(self, FreeboxError::NotAuthorized)
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FreeboxError::Transport(_) => "E_FBX_TRANSPORT",
            FreeboxError::MalformedResponse { .. } => "E_FBX_MALFORMED",
            FreeboxError::NotAuthorized => "E_FBX_NOT_AUTHORIZED",
            FreeboxError::Protocol { .. } => "E_FBX_PROTOCOL",
            FreeboxError::SessionRejected { .. } => "E_FBX_SESSION",
            FreeboxError::DuplicateInstance { .. } => "E_FBX_DUPLICATE",
            FreeboxError::Credentials(_) => "E_FBX_CREDENTIALS",
            FreeboxError::Io(_) => "E_FBX_IO",
            FreeboxError::NoRuntime => "E_FBX_RUNTIME",
            FreeboxError::Config(_) => "E_FBX_CONFIG",
        }
    }
}
