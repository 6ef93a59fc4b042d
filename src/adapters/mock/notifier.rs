//! Recording notifier for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{Notification, Notifier, NotifyError};

/// Notifier that keeps every delivered notification in memory.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    name: String,
    delivered: Arc<Mutex<Vec<Notification>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::named("recording")
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Configure whether delivery should fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap_or_else(PoisonError::into_inner) = should_fail;
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        if *self.should_fail.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(NotifyError::Delivery("mock failure".to_string()));
        }
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).push(notification.clone());
        Ok(())
    }
}
