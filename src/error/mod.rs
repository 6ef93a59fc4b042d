//! Error handling for the Freebox watcher.
//!
//! | Category | Examples | Retryable |
//! |----------|----------|-----------|
//! | Network | connection refused, garbled JSON | Yes |
//! | Auth | pairing token revoked, session rejected after refresh | No |
//! | Server | unexpected status or error code | Yes |
//! | Client | duplicate identity, no runtime | No |
//! | System | token file or voicemail download I/O | No |
//! | Configuration | no notification channel | No |
//!
//! "Not found" results (an unknown call id) are not errors: they surface as
//! `Ok(None)`.

mod category;
mod freebox_error;

pub use category::ErrorCategory;
pub use freebox_error::FreeboxError;

/// Type alias for Results using [`FreeboxError`].
pub type FreeboxResult<T> = Result<T, FreeboxError>;
