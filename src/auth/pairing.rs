//! Pairing an application with the appliance.
//!
//! Flow:
//! 1. Submit the application identity, receive a pairing token and a track id
//! 2. A human presses "yes" on the Freebox front panel
//! 3. Poll the track id until the status leaves "pending"
//!
//! The wait is unbounded unless a deadline is set. Dropping the future
//! abandons the pairing without persisting anything.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::api::{LoginApi, PairingStatus};
use super::identity::AppIdentity;
use crate::error::FreeboxResult;

/// Default delay between two pairing progress checks.
pub const DEFAULT_PAIRING_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How the pairing progress is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingPolicy {
    pub poll_interval: Duration,
    /// `None` waits as long as the human takes.
    pub timeout: Option<Duration>,
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_PAIRING_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl PairingPolicy {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Result of a pairing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    /// The human accepted; carries the new pairing token.
    Granted(String),
    /// The appliance reported a final status other than "granted".
    Refused(PairingStatus),
    /// The configured deadline elapsed while still pending.
    TimedOut,
}

impl PairingOutcome {
    pub fn token(&self) -> Option<&str> {
        match self {
            PairingOutcome::Granted(token) => Some(token),
            _ => None,
        }
    }
}

/// Run one pairing cycle for `identity`.
pub async fn pair(
    api: &LoginApi,
    identity: &AppIdentity,
    policy: PairingPolicy,
) -> FreeboxResult<PairingOutcome> {
    info!(
        app_id = identity.id(),
        "Authorization needed, select YES on the Freebox front panel"
    );
    let grant = api.request_authorization(identity).await?;
    debug!(track_id = %grant.track_id, "Pairing requested");

    let wait = wait_for_decision(api, &grant.track_id, policy.poll_interval);
    let status = match policy.timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(timeout_secs = limit.as_secs(), "Pairing not confirmed in time");
                return Ok(PairingOutcome::TimedOut);
            }
        },
        None => wait.await?,
    };

    if status == PairingStatus::Granted {
        info!(app_id = identity.id(), "Pairing granted");
        Ok(PairingOutcome::Granted(grant.app_token))
    } else {
        warn!(status = status.as_str(), "Authorization not granted");
        Ok(PairingOutcome::Refused(status))
    }
}

async fn wait_for_decision(
    api: &LoginApi,
    track_id: &str,
    interval: Duration,
) -> FreeboxResult<PairingStatus> {
    loop {
        let progress = api.authorization_progress(track_id).await?;
        if progress.status != PairingStatus::Pending {
            return Ok(progress.status);
        }
        debug!(track_id, "Pairing still pending");
        tokio::time::sleep(interval).await;
    }
}
