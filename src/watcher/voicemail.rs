//! Detects new voicemails and downloads their audio before notifying.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::poller::{PollOutcome, Poller};
use crate::error::FreeboxResult;
use crate::freebox::FreeBox;
use crate::models::Voicemail;

/// Default delay between two voicemail list fetches.
pub const VOICEMAIL_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Highest voicemail date already notified.
///
/// Starts at 0, so unread voicemails already waiting when the watcher starts
/// are notified once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoicemailCursor {
    pub last_date: i64,
}

/// A new voicemail with its audio saved locally.
#[derive(Debug, Clone, PartialEq)]
pub struct VoicemailEvent {
    pub voicemail: Voicemail,
    pub audio_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct VoicemailPoller {
    freebox: Arc<FreeBox>,
    download_dir: PathBuf,
}

impl VoicemailPoller {
    pub fn new(freebox: Arc<FreeBox>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            freebox,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    async fn save_audio(&self, voicemail: &Voicemail) -> FreeboxResult<PathBuf> {
        let audio = self.freebox.download_voicemail_audio(&voicemail.id).await?;
        let path = self
            .download_dir
            .join(format!("{}-{}", file_safe(&voicemail.id), audio.filename));
        tokio::fs::write(&path, &audio.content).await?;
        debug!(id = %voicemail.id, path = %path.display(), "Saved voicemail audio");
        Ok(path)
    }
}

fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl Poller for VoicemailPoller {
    type Event = VoicemailEvent;
    type Cursor = VoicemailCursor;

    fn name(&self) -> &'static str {
        "voicemail"
    }

    async fn poll_once(
        &self,
        cursor: &VoicemailCursor,
    ) -> FreeboxResult<PollOutcome<VoicemailEvent, VoicemailCursor>> {
        let mut fresh: Vec<Voicemail> = self
            .freebox
            .list_voicemails()
            .await?
            .into_iter()
            .filter(|vm| vm.is_unread() && vm.date > cursor.last_date)
            .collect();

        if fresh.is_empty() {
            return Ok(PollOutcome::empty(*cursor));
        }
        fresh.sort_by_key(|vm| vm.date);
        tokio::fs::create_dir_all(&self.download_dir).await?;

        let mut events = Vec::with_capacity(fresh.len());
        let mut next = *cursor;
        for voicemail in fresh {
            match self.save_audio(&voicemail).await {
                Ok(audio_path) => {
                    next.last_date = voicemail.date;
                    events.push(VoicemailEvent {
                        voicemail,
                        audio_path,
                    });
                }
                // Nothing delivered yet: fail the cycle, it is retried as a whole.
                Err(e) if events.is_empty() => return Err(e),
                Err(e) => {
                    warn!(id = %voicemail.id, error = %e, "Audio download failed, retrying next cycle");
                    break;
                }
            }
        }

        Ok(PollOutcome::new(events, next))
    }
}
