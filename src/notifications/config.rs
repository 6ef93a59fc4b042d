//! Notification configuration file.
//!
//! ```json
//! {
//!   "channels": [
//!     {"type": "webhook", "url": "https://hooks.example/freebox"},
//!     {"type": "desktop"}
//!   ],
//!   "directory": {
//!     "0102030405": {"name": "Boulangerie", "category": "Business"}
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::desktop::DesktopNotifier;
use super::lookup::{NoLookup, StaticDirectory};
use super::multi::MultiNotifier;
use super::webhook::WebhookNotifier;
use crate::error::{FreeboxError, FreeboxResult};
use crate::traits::{CallerIdentity, HttpClient, IdentityLookup, Notifier};

/// One delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelConfig {
    Webhook { url: String },
    Desktop,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    /// Known numbers used for reverse lookup.
    #[serde(default)]
    pub directory: HashMap<String, CallerIdentity>,
}

impl NotifyConfig {
    pub fn from_json(json: &str) -> FreeboxResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| FreeboxError::Config(format!("invalid notification config: {}", e)))
    }

    /// Read the config file at `path`.
    pub fn load(path: &Path) -> FreeboxResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FreeboxError::Config(format!(
                "cannot read notification config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Build the fan-out notifier.
    ///
    /// # Errors
    /// [`FreeboxError::Config`] when no channel is configured.
    pub fn build_notifier(&self, http: Arc<dyn HttpClient>) -> FreeboxResult<MultiNotifier> {
        if self.channels.is_empty() {
            return Err(FreeboxError::Config(
                "no notification channel configured".to_string(),
            ));
        }

        let channels = self
            .channels
            .iter()
            .map(|channel| -> Arc<dyn Notifier> {
                match channel {
                    ChannelConfig::Webhook { url } => {
                        Arc::new(WebhookNotifier::new(Arc::clone(&http), url.clone()))
                    }
                    ChannelConfig::Desktop => Arc::new(DesktopNotifier::new()),
                }
            })
            .collect();
        Ok(MultiNotifier::new(channels))
    }

    /// Lookup provider backed by the configured directory, if any.
    pub fn build_lookup(&self) -> Arc<dyn IdentityLookup> {
        if self.directory.is_empty() {
            Arc::new(NoLookup)
        } else {
            Arc::new(StaticDirectory::new(self.directory.clone()))
        }
    }
}
