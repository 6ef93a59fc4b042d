//! Watcher configuration.
//!
//! Defaults, overridable with environment variables or the builder methods.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{PairingPolicy, DEFAULT_PAIRING_POLL_INTERVAL};
use crate::error::{FreeboxError, FreeboxResult};
use crate::freebox::DEFAULT_BASE_URL;
use crate::startup::health::{DEFAULT_READY_POLL_INTERVAL, DEFAULT_READY_TIMEOUT_SECS};
use crate::watcher::{CALL_POLL_INTERVAL, VOICEMAIL_POLL_INTERVAL};

pub const ENV_URL: &str = "FREEBOX_URL";
pub const ENV_TOKEN_DIR: &str = "FREEBOX_TOKEN_DIR";
pub const ENV_VOICEMAIL_DIR: &str = "FREEBOX_VOICEMAIL_DIR";
pub const ENV_NOTIFY_CONFIG: &str = "FREEBOX_NOTIFY_CONFIG";
pub const ENV_PAIRING_TIMEOUT: &str = "FREEBOX_PAIRING_TIMEOUT_SECS";

/// Default name of the notification config file, looked up in the working
/// directory.
pub const DEFAULT_NOTIFY_CONFIG: &str = "notify_config.json";

/// Configuration for the watcher binary.
///
/// # Example
///
/// ```ignore
/// use freebox_watcher::startup::WatcherConfig;
///
/// let config = WatcherConfig::default()
///     .with_base_url("http://192.168.1.254")
///     .with_pairing_timeout(Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    /// Appliance address, without the API prefix
    pub base_url: String,
    /// Directory holding one pairing token file per application id
    pub token_dir: PathBuf,
    /// Where downloaded voicemail audio goes
    pub voicemail_dir: PathBuf,
    /// Notification channels file
    pub notify_config: PathBuf,
    pub ready_timeout: Duration,
    pub ready_poll_interval: Duration,
    pub call_interval: Duration,
    pub voicemail_interval: Duration,
    pub pairing_poll_interval: Duration,
    /// `None` waits for the front panel confirmation indefinitely
    pub pairing_timeout: Option<Duration>,
}

fn default_token_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".freebox-watcher")
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_dir: default_token_dir(),
            voicemail_dir: std::env::temp_dir()
                .join("freebox-watcher")
                .join("voicemails"),
            notify_config: PathBuf::from(DEFAULT_NOTIFY_CONFIG),
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            ready_poll_interval: DEFAULT_READY_POLL_INTERVAL,
            call_interval: CALL_POLL_INTERVAL,
            voicemail_interval: VOICEMAIL_POLL_INTERVAL,
            pairing_poll_interval: DEFAULT_PAIRING_POLL_INTERVAL,
            pairing_timeout: None,
        }
    }
}

impl WatcherConfig {
    /// Create a new WatcherConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = dir.into();
        self
    }

    pub fn with_voicemail_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.voicemail_dir = dir.into();
        self
    }

    pub fn with_notify_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.notify_config = path.into();
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_call_interval(mut self, interval: Duration) -> Self {
        self.call_interval = interval;
        self
    }

    pub fn with_voicemail_interval(mut self, interval: Duration) -> Self {
        self.voicemail_interval = interval;
        self
    }

    pub fn with_pairing_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pairing_timeout = timeout;
        self
    }

    /// Pairing settings derived from this config.
    pub fn pairing_policy(&self) -> PairingPolicy {
        PairingPolicy::default()
            .with_poll_interval(self.pairing_poll_interval)
            .with_timeout(self.pairing_timeout)
    }

    /// Defaults overridden by the `FREEBOX_*` environment variables.
    ///
    /// # Errors
    /// [`FreeboxError::Config`] if `FREEBOX_PAIRING_TIMEOUT_SECS` is not a
    /// number.
    pub fn from_env() -> FreeboxResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`WatcherConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> FreeboxResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_URL) {
            config = config.with_base_url(url.trim_end_matches('/'));
        }
        if let Some(dir) = get(ENV_TOKEN_DIR) {
            config = config.with_token_dir(dir);
        }
        if let Some(dir) = get(ENV_VOICEMAIL_DIR) {
            config = config.with_voicemail_dir(dir);
        }
        if let Some(path) = get(ENV_NOTIFY_CONFIG) {
            config = config.with_notify_config(path);
        }
        if let Some(secs) = get(ENV_PAIRING_TIMEOUT) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                FreeboxError::Config(format!("{} must be a number of seconds", ENV_PAIRING_TIMEOUT))
            })?;
            config = config.with_pairing_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(config)
    }
}
