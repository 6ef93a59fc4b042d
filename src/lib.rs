//! Freebox watcher - incoming call and voicemail notifications for a Freebox
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod error;
pub mod freebox;
pub mod models;
pub mod notifications;
pub mod startup;
pub mod traits;
pub mod watcher;

pub use error::{ErrorCategory, FreeboxError, FreeboxResult};
pub use freebox::{FreeBox, FreeBoxBuilder};
