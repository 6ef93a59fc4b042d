//! Native OS notification channel.
//!
//! Uses `osascript` on macOS (no bundle identifier or permissions needed).
//! Elsewhere the notification is only logged.

use async_trait::async_trait;

use crate::traits::{Notification, Notifier, NotifyError};

#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let title = notification.title.clone();
        let body = notification.body.clone();
        tokio::task::spawn_blocking(move || send_notification(&title, &body))
            .await
            .map_err(|e| NotifyError::Delivery(format!("notification task failed: {}", e)))?
    }
}

/// Escape double quotes and backslashes for AppleScript string literals.
#[cfg(any(target_os = "macos", test))]
fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(target_os = "macos")]
fn send_notification(title: &str, body: &str) -> Result<(), NotifyError> {
    use std::process::Command;

    let script = format!(
        "display notification \"{}\" with title \"{}\" sound name \"Glass\"",
        escape_applescript(body),
        escape_applescript(title)
    );

    match Command::new("osascript").arg("-e").arg(&script).output() {
        Ok(output) if !output.status.success() => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(NotifyError::Delivery(format!(
                "osascript notification failed: {}",
                stderr.trim()
            )))
        }
        Err(e) => Err(NotifyError::Unavailable(format!(
            "failed to spawn osascript: {}",
            e
        ))),
        _ => {
            tracing::debug!("OS notification sent successfully");
            Ok(())
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn send_notification(title: &str, body: &str) -> Result<(), NotifyError> {
    tracing::info!("{}: {}", title, body.replace('\n', " | "));
    Ok(())
}
