//! Waiting for the appliance to come up.
//!
//! Polls the unauthenticated readiness endpoint until it answers or the
//! timeout is reached.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::freebox::FreeBox;

/// Default timeout for the readiness wait (5 minutes)
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 300;

/// Default interval between readiness probes
pub const DEFAULT_READY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Error type for the readiness wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    /// The appliance never answered
    Timeout { waited_secs: u64 },
}

impl std::fmt::Display for ReadinessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadinessError::Timeout { waited_secs } => write!(
                f,
                "Timeout after {} seconds waiting for the Freebox to answer",
                waited_secs
            ),
        }
    }
}

impl std::error::Error for ReadinessError {}

/// Wait until [`FreeBox::is_ready`] returns true.
///
/// Probes immediately, then every `interval`. Returns the time waited.
pub async fn wait_for_ready(
    freebox: &FreeBox,
    timeout: Duration,
    interval: Duration,
) -> Result<Duration, ReadinessError> {
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if freebox.is_ready().await {
            let waited = start.elapsed();
            tracing::info!(attempts, "Freebox is ready");
            return Ok(waited);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::warn!(attempts, "Freebox did not become ready");
            return Err(ReadinessError::Timeout {
                waited_secs: elapsed.as_secs(),
            });
        }

        tracing::debug!(attempts, "Freebox not ready yet");
        sleep(interval.min(timeout - elapsed)).await;
    }
}
