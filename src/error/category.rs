//! Error category classification.
//!
//! Categories drive the two handling decisions the watcher makes: whether a
//! failed poll is simply retried on the next tick, and whether startup
//! should give up.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection refused, timeout, garbled reply).
    Network,

    /// The appliance refused our credentials.
    Auth,

    /// The appliance answered with an unexpected status or payload.
    Server,

    /// Misuse of the library (duplicate identity, no runtime).
    Client,

    /// Filesystem errors (token file, voicemail downloads).
    System,

    /// Missing or invalid configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the Freebox is reachable on the local network",
            ErrorCategory::Auth => {
                "Delete the stored token and accept the pairing request on the Freebox front panel"
            }
            ErrorCategory::Server => "The Freebox API returned something unexpected; try again later",
            ErrorCategory::Client => "This may be a bug. Please report this issue if it persists",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Configuration => "Check your configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
