use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_nullable_string};

/// One voicemail message (`/call/voicemail/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voicemail {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Unix timestamp when the message was left.
    pub date: i64,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub phone_number: String,
    /// Length of the recording in seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl Voicemail {
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_voicemail() {
        let json = r#"{
            "id": "msg_1700000000_0",
            "date": 1700000000,
            "phone_number": "0612345678",
            "duration": 17,
            "read": false,
            "country_code": "33"
        }"#;
        let vm: Voicemail = serde_json::from_str(json).unwrap();
        assert_eq!(vm.id, "msg_1700000000_0");
        assert_eq!(vm.duration, 17);
        assert!(vm.is_unread());
    }

    #[test]
    fn test_numeric_id() {
        let json = r#"{"id": 7, "date": 1, "read": true}"#;
        let vm: Voicemail = serde_json::from_str(json).unwrap();
        assert_eq!(vm.id, "7");
        assert!(!vm.is_unread());
        assert_eq!(vm.phone_number, "");
    }
}
