//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST)
//! - [`TokenStore`] - Pairing token storage and retrieval
//! - [`Notifier`] - Notification delivery channel
//! - [`IdentityLookup`] - Reverse phone number lookup

pub mod credentials;
pub mod http;
pub mod lookup;
pub mod notifier;

pub use credentials::{CredentialsError, TokenStore};
pub use http::{Headers, HttpClient, HttpError, Response};
pub use lookup::{CallerIdentity, IdentityLookup, LookupError};
pub use notifier::{Notification, Notifier, NotifyError};
