//! Authentication with the Freebox.
//!
//! This module provides:
//! - Application identity and the live-identity registry
//! - Pairing token file storage
//! - Login endpoint client and challenge-response password derivation
//! - Pairing flow
//! - Self-refreshing authenticated session

pub mod api;
pub mod challenge;
pub mod credentials;
pub mod identity;
pub mod pairing;
pub mod session;

pub use api::{LoginApi, PairingStatus, AUTH_HEADER};
pub use challenge::compute_password;
pub use credentials::TokenFileManager;
pub use identity::{is_registered, AppIdentity, IdentityGuard};
pub use pairing::{PairingOutcome, PairingPolicy, DEFAULT_PAIRING_POLL_INTERVAL};
pub use session::Session;
