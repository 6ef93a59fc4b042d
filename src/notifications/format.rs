//! Notification text for calls and voicemails.

use chrono::{Local, TimeZone};
use tracing::warn;

use crate::models::CallEntry;
use crate::traits::{CallerIdentity, IdentityLookup, Notification};
use crate::watcher::VoicemailEvent;

pub const CALL_TITLE: &str = "Incoming call";
pub const VOICEMAIL_TITLE: &str = "New voicemail";

/// Body for a call, given what the lookup found (if it was consulted).
pub fn call_body(call: &CallEntry, identity: Option<&CallerIdentity>) -> String {
    if call.has_contact() {
        return format!("{} ({})", call.name, call.number);
    }

    let Some(identity) = identity else {
        return call.number.clone();
    };

    let mut body = if identity.name.is_empty() {
        call.number.clone()
    } else {
        format!(
            "{} - {} ({})\n{}",
            identity.name, identity.category, call.number, identity.address
        )
    };
    if !identity.advisory.is_empty() {
        body.push('\n');
        body.push_str(&identity.advisory);
    }
    body
}

/// Build the notification for an incoming call.
///
/// Known contacts skip the lookup. Lookup errors are logged and ignored.
pub async fn call_notification(call: &CallEntry, lookup: &dyn IdentityLookup) -> Notification {
    let identity = if call.has_contact() {
        None
    } else {
        match lookup.lookup(&call.number).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(number = %call.number, error = %e, "Caller lookup failed");
                None
            }
        }
    };
    Notification::new(CALL_TITLE, call_body(call, identity.as_ref()))
}

/// Build the notification for a new voicemail, with its audio attached.
pub fn voicemail_notification(event: &VoicemailEvent) -> Notification {
    let voicemail = &event.voicemail;
    let number = if voicemail.phone_number.is_empty() {
        "Unknown caller"
    } else {
        voicemail.phone_number.as_str()
    };

    let mut body = format!("{} left a {}s message", number, voicemail.duration);
    if let Some(at) = Local.timestamp_opt(voicemail.date, 0).single() {
        body.push_str(&format!(" at {}", at.format("%Y-%m-%d %H:%M")));
    }

    Notification::new(VOICEMAIL_TITLE, body).with_attachment(&event.audio_path)
}
