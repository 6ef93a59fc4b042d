//! Downloaded voicemail audio and filename extraction.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;

/// Name used when the appliance sends no usable `Content-Disposition`.
pub const DEFAULT_AUDIO_FILENAME: &str = "voicemail.wav";

static EXTENDED_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\*\s*=\s*(?:UTF-8|ISO-8859-1)?'[^']*'([^;]+)"#)
        .expect("Invalid extended filename regex")
});

static PLAIN_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;\s]+))"#)
        .expect("Invalid filename regex")
});

/// Audio content of a voicemail plus the filename the appliance suggested.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFile {
    pub filename: String,
    pub content: Bytes,
}

impl AudioFile {
    pub fn new(filename: impl Into<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Extract a safe filename from a `Content-Disposition` header value.
///
/// `filename*=` wins over `filename=`. Path components are stripped so the
/// result can be joined onto a download directory.
pub fn filename_from_content_disposition(header: Option<&str>) -> String {
    let Some(value) = header else {
        return DEFAULT_AUDIO_FILENAME.to_string();
    };

    let extended = EXTENDED_FILENAME
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| urlencoding::decode(m.as_str().trim()).ok())
        .map(|s| s.into_owned());

    let candidate = extended.or_else(|| {
        PLAIN_FILENAME
            .captures(value)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
    });

    candidate
        .map(|name| sanitize(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_AUDIO_FILENAME.to_string())
}

fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let trimmed = base.trim();
    if trimmed == "." || trimmed == ".." {
        return String::new();
    }
    trimmed.to_string()
}
