//! Webhook channel: POSTs the notification as JSON.
//!
//! The payload is `{title, body, attachment?}`. `attachment` is a path on
//! the machine running the watcher (the downloaded voicemail audio), not the
//! audio itself: only a receiver sharing that filesystem can open it. Remote
//! receivers should treat it as an opaque reference.

use std::sync::Arc;

use async_trait::async_trait;

use crate::traits::{Headers, HttpClient, HttpError, Notification, Notifier, NotifyError};

/// Sends `{title, body, attachment}` to a URL.
pub struct WebhookNotifier {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl WebhookNotifier {
    pub fn new(http: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = serde_json::to_string(notification)
            .map_err(|e| NotifyError::Delivery(format!("cannot encode notification: {}", e)))?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let response = self
            .http
            .post(&self.url, &body, &headers)
            .await
            .map_err(|e| match e {
                HttpError::ConnectionFailed(_) | HttpError::Timeout(_) => {
                    NotifyError::Unavailable(e.to_string())
                }
                other => NotifyError::Delivery(other.to_string()),
            })?;

        if !response.is_success() {
            return Err(NotifyError::Delivery(format!(
                "webhook answered HTTP {}",
                response.status
            )));
        }
        tracing::debug!(url = %self.url, "Webhook notification delivered");
        Ok(())
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url)
            .finish()
    }
}
