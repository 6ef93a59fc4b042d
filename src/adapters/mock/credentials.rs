//! In-memory token store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::AppIdentity;
use crate::traits::{CredentialsError, TokenStore};

/// In-memory pairing token store.
///
/// Clones share state, so a test can keep a handle and inspect what the
/// session persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<Mutex<HashMap<String, String>>>,
    save_should_fail: Arc<Mutex<bool>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token for `app_id`.
    pub fn with_token(app_id: &str, token: &str) -> Self {
        let store = Self::new();
        store
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(app_id.to_string(), token.to_string());
        store
    }

    /// Configure whether save should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap_or_else(PoisonError::into_inner) = should_fail;
    }

    /// Read the stored token without going through the trait.
    pub fn token(&self, app_id: &str) -> Option<String> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner).get(app_id).cloned()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self, identity: &AppIdentity) -> Result<Option<String>, CredentialsError> {
        Ok(self.token(identity.id()))
    }

    async fn save(&self, identity: &AppIdentity, token: &str) -> Result<(), CredentialsError> {
        if *self.save_should_fail.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(CredentialsError::SaveFailed("Mock save failure".to_string()));
        }
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identity.id().to_string(), token.to_string());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
