//! Application identity and the process-wide registry of live identities.
//!
//! The appliance issues one pairing token per application id, and that
//! token lives in one file. Two clients sharing an id in the same process
//! would race on that file, so construction registers the id here and
//! fails if it is already taken.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{FreeboxError, FreeboxResult};

static LIVE_IDENTITIES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Identity presented to the appliance when pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppIdentity {
    #[serde(rename = "app_id")]
    id: String,
    #[serde(rename = "app_name")]
    name: String,
    #[serde(rename = "app_version")]
    version: String,
    device_name: String,
}

impl AppIdentity {
    /// Create an identity, using the machine hostname as device name.
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        let device_name = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self::with_device(id, name, version, device_name)
    }

    /// Create an identity with an explicit device name.
    pub fn with_device(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            device_name: device_name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Registration of an identity id in the live registry.
///
/// The id is released when the guard is dropped.
#[derive(Debug)]
pub struct IdentityGuard {
    app_id: String,
}

impl IdentityGuard {
    /// Claim `identity`'s id for this process.
    ///
    /// Fails with [`FreeboxError::DuplicateInstance`] if another live client
    /// already holds it.
    pub fn register(identity: &AppIdentity) -> FreeboxResult<Self> {
        let mut live = LIVE_IDENTITIES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !live.insert(identity.id().to_string()) {
            return Err(FreeboxError::DuplicateInstance {
                app_id: identity.id().to_string(),
            });
        }
        tracing::debug!("Registered application identity {}", identity.id());
        Ok(Self {
            app_id: identity.id().to_string(),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl Drop for IdentityGuard {
    fn drop(&mut self) {
        let mut live = LIVE_IDENTITIES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        live.remove(&self.app_id);
        tracing::debug!("Released application identity {}", self.app_id);
    }
}

/// Whether an identity id is currently held by a live client.
pub fn is_registered(app_id: &str) -> bool {
    LIVE_IDENTITIES
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .contains(app_id)
}
