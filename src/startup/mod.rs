//! Startup configuration and readiness wait.
//!
//! - [`config`] - Watcher configuration from defaults and environment
//! - [`health`] - Waiting for the appliance to answer

pub mod config;
pub mod health;

pub use config::WatcherConfig;
pub use health::{wait_for_ready, ReadinessError, DEFAULT_READY_TIMEOUT_SECS};
