//! Background polling with subscriber callbacks.
//!
//! A [`Watcher`] owns a subscriber set and one poll task. What is polled is
//! decided by its [`Poller`]:
//! - [`CallPoller`] for incoming calls (every second)
//! - [`VoicemailPoller`] for new voicemails (every 30 seconds)

mod calls;
mod engine;
mod poller;
mod voicemail;

pub use calls::{CallCursor, CallPoller, CALL_POLL_INTERVAL};
pub use engine::{Callback, Watcher};
pub use poller::{PollOutcome, Poller};
pub use voicemail::{VoicemailCursor, VoicemailEvent, VoicemailPoller, VOICEMAIL_POLL_INTERVAL};

/// Watcher for incoming calls.
pub type CallWatcher = Watcher<CallPoller>;

/// Watcher for new voicemails.
pub type VoicemailWatcher = Watcher<VoicemailPoller>;
