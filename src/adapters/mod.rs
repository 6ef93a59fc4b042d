//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileTokenStore`] - File-based pairing token storage
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::InMemoryTokenStore`] - In-memory token storage
//! - [`mock::RecordingNotifier`] - Records delivered notifications

pub mod file_credentials;
pub mod mock;
pub mod reqwest_http;

pub use file_credentials::FileTokenStore;
pub use mock::{InMemoryTokenStore, MockHttpClient, RecordingNotifier};
pub use reqwest_http::ReqwestHttpClient;
