//! Notification delivery trait abstraction.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Local file to attach (voicemail audio).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<PathBuf>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

/// Notification delivery errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The channel was reached but refused or failed the delivery
    Delivery(String),
    /// The channel cannot be reached
    Unavailable(String),
    /// No channel delivered the notification
    AllChannelsFailed(usize),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::Delivery(msg) => write!(f, "Notification delivery failed: {}", msg),
            NotifyError::Unavailable(msg) => write!(f, "Notification channel unavailable: {}", msg),
            NotifyError::AllChannelsFailed(count) => {
                write!(f, "All {} notification channels failed", count)
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// A notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}
