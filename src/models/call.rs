use serde::{Deserialize, Serialize};

use super::deserialize_nullable_string;

/// Direction and outcome of a call log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Missed,
    Accepted,
    Outgoing,
    #[serde(other)]
    Unknown,
}

/// One entry of the call log (`/call/log/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: CallType,
    /// Unix timestamp of the start of the call.
    #[serde(default)]
    pub datetime: i64,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub number: String,
    /// Contact name, or the number when the caller is not a contact.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    /// Duration in seconds. Zero while the line is still ringing.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub new: bool,
    /// Id of the matching contact, 0 when unknown.
    #[serde(default)]
    pub contact_id: i64,
}

impl CallEntry {
    /// A call that is still ringing shows up as missed with no duration yet.
    pub fn is_ringing(&self) -> bool {
        self.kind == CallType::Missed && self.duration == 0
    }

    /// Whether the caller matches a contact in the Freebox address book.
    pub fn has_contact(&self) -> bool {
        self.contact_id != 0
    }
}
