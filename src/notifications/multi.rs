//! Fan-out over several channels.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::traits::{Notification, Notifier, NotifyError};

/// Delivers to every channel. Succeeds if at least one channel did.
#[derive(Clone, Default)]
pub struct MultiNotifier {
    channels: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    pub fn new(channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn push(&mut self, channel: Arc<dyn Notifier>) {
        self.channels.push(channel);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    fn name(&self) -> &str {
        "multi"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut delivered = 0;
        for channel in &self.channels {
            match channel.deliver(notification).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(channel = channel.name(), error = %e, "Notification channel failed"),
            }
        }

        if delivered == 0 {
            return Err(NotifyError::AllChannelsFailed(self.channels.len()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MultiNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.channels.iter().map(|c| c.name()).collect();
        f.debug_struct("MultiNotifier").field("channels", &names).finish()
    }
}
