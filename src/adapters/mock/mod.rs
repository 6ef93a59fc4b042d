//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with queued per-URL responses
//! - [`InMemoryTokenStore`] - In-memory pairing token storage
//! - [`RecordingNotifier`] - Notifier that records deliveries

pub mod credentials;
pub mod http;
pub mod notifier;

pub use credentials::InMemoryTokenStore;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use notifier::RecordingNotifier;
