//! Reverse phone number lookup trait abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a lookup provider knows about a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerIdentity {
    pub name: String,
    /// Kind of caller, e.g. "Business" or "Private".
    pub category: String,
    pub address: String,
    /// Free text warning, e.g. a spam report.
    pub advisory: String,
}

/// Lookup errors. Callers treat every error as "no information".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The provider could not be reached
    Unavailable(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Unavailable(msg) => write!(f, "Lookup provider unavailable: {}", msg),
            LookupError::Other(msg) => write!(f, "Lookup error: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Find who owns `number`. `Ok(None)` when unknown.
    async fn lookup(&self, number: &str) -> Result<Option<CallerIdentity>, LookupError>;
}
