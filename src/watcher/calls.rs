//! Detects incoming calls by probing the call log for the next id.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::poller::{PollOutcome, Poller};
use crate::error::FreeboxResult;
use crate::freebox::FreeBox;
use crate::models::CallEntry;

/// Default delay between two call log probes.
pub const CALL_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Next call log id to probe. `None` until the log has been read once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCursor {
    pub next_id: Option<i64>,
}

/// Emits a [`CallEntry`] for every call that is still ringing when it
/// first shows up in the call log.
#[derive(Debug, Clone)]
pub struct CallPoller {
    freebox: Arc<FreeBox>,
}

impl CallPoller {
    pub fn new(freebox: Arc<FreeBox>) -> Self {
        Self { freebox }
    }

    fn observe(call: CallEntry) -> PollOutcome<CallEntry, CallCursor> {
        let cursor = CallCursor {
            next_id: Some(call.id + 1),
        };
        if call.is_ringing() {
            debug!(id = call.id, number = %call.number, "Incoming call");
            PollOutcome::new(vec![call], cursor)
        } else {
            PollOutcome::empty(cursor)
        }
    }
}

#[async_trait]
impl Poller for CallPoller {
    type Event = CallEntry;
    type Cursor = CallCursor;

    fn name(&self) -> &'static str {
        "calls"
    }

    async fn poll_once(
        &self,
        cursor: &CallCursor,
    ) -> FreeboxResult<PollOutcome<CallEntry, CallCursor>> {
        match cursor.next_id {
            None => {
                let calls = self.freebox.list_calls().await?;
                match calls.into_iter().next() {
                    Some(latest) => Ok(Self::observe(latest)),
                    None => Ok(PollOutcome::empty(CallCursor { next_id: Some(0) })),
                }
            }
            Some(next_id) => match self.freebox.get_call(next_id).await? {
                Some(call) => Ok(Self::observe(call)),
                None => Ok(PollOutcome::empty(*cursor)),
            },
        }
    }
}
