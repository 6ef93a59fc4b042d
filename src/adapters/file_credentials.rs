//! File-based token store adapter.
//!
//! Wraps [`TokenFileManager`] and implements [`TokenStore`]. File I/O is
//! pushed onto the blocking pool so the poll tasks never stall on disk.

use async_trait::async_trait;

use crate::auth::credentials::TokenFileManager;
use crate::auth::AppIdentity;
use crate::traits::{CredentialsError, TokenStore};

/// File-based pairing token store.
///
/// Tokens are stored as `<dir>/<app id>.token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    manager: TokenFileManager,
}

impl FileTokenStore {
    /// Create a store rooted at `~/.freebox-watcher`.
    pub fn new() -> Result<Self, CredentialsError> {
        TokenFileManager::new()
            .map(|manager| Self { manager })
            .ok_or_else(|| CredentialsError::Other("Failed to determine home directory".to_string()))
    }

    /// Create a store rooted at a custom directory.
    pub fn with_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            manager: TokenFileManager::with_dir(dir),
        }
    }

    /// Get a reference to the underlying file manager.
    pub fn manager(&self) -> &TokenFileManager {
        &self.manager
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, identity: &AppIdentity) -> Result<Option<String>, CredentialsError> {
        let manager = self.manager.clone();
        let app_id = identity.id().to_string();
        tokio::task::spawn_blocking(move || manager.load(&app_id))
            .await
            .map_err(|e| CredentialsError::LoadFailed(e.to_string()))?
    }

    async fn save(&self, identity: &AppIdentity, token: &str) -> Result<(), CredentialsError> {
        let manager = self.manager.clone();
        let app_id = identity.id().to_string();
        let token = token.to_string();
        tokio::task::spawn_blocking(move || manager.save(&app_id, &token))
            .await
            .map_err(|e| CredentialsError::SaveFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_through_trait() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::with_dir(temp_dir.path());
        let identity = AppIdentity::with_device("fr.example.store", "Store", "1.0", "host");

        assert_eq!(store.load(&identity).await.unwrap(), None);
        store.save(&identity, "paired-token").await.unwrap();
        assert_eq!(
            store.load(&identity).await.unwrap().as_deref(),
            Some("paired-token")
        );
        assert!(store
            .manager()
            .path_for("fr.example.store")
            .ends_with("fr.example.store.token"));
    }
}
