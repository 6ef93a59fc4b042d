//! Pairing token storage trait abstraction.

use async_trait::async_trait;

use crate::auth::AppIdentity;

/// Token storage errors.
#[derive(Debug, Clone)]
pub enum CredentialsError {
    /// Failed to load the token
    LoadFailed(String),
    /// Failed to save the token
    SaveFailed(String),
    /// Stored token is not valid UTF-8 or is empty
    Corrupted(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsError::LoadFailed(msg) => write!(f, "Failed to load pairing token: {}", msg),
            CredentialsError::SaveFailed(msg) => write!(f, "Failed to save pairing token: {}", msg),
            CredentialsError::Corrupted(msg) => write!(f, "Stored pairing token is corrupted: {}", msg),
            CredentialsError::Other(msg) => write!(f, "Credentials error: {}", msg),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Storage for the long-lived pairing token of an application identity.
///
/// Each identity id owns its own slot, so two identities never write to the
/// same place.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the pairing token for `identity`.
    ///
    /// # Returns
    /// - `Ok(Some(token))` if a token is stored
    /// - `Ok(None)` if nothing is stored yet (pairing is required)
    /// - `Err(error)` if the storage exists but could not be read
    async fn load(&self, identity: &AppIdentity) -> Result<Option<String>, CredentialsError>;

    /// Persist the pairing token for `identity`, replacing any previous one.
    async fn save(&self, identity: &AppIdentity, token: &str) -> Result<(), CredentialsError>;
}
