//! The per-domain polling strategy driven by a [`Watcher`](super::Watcher).

use async_trait::async_trait;

use crate::error::FreeboxResult;

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome<E, C> {
    /// New events since the cursor, in delivery order.
    pub events: Vec<E>,
    /// Cursor to use for the next cycle once the events are delivered.
    pub cursor: C,
}

impl<E, C> PollOutcome<E, C> {
    pub fn new(events: Vec<E>, cursor: C) -> Self {
        Self { events, cursor }
    }

    /// No new events; move the cursor anyway.
    pub fn empty(cursor: C) -> Self {
        Self {
            events: Vec::new(),
            cursor,
        }
    }
}

/// Fetches new events relative to a cursor.
///
/// Pollers are stateless between cycles: the cursor lives in the watcher's
/// task and starts from `Cursor::default()` every time the task starts.
#[async_trait]
pub trait Poller: Send + Sync + 'static {
    type Event: Send + Sync + 'static;
    type Cursor: Default + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch events newer than `cursor`.
    ///
    /// An error means the cycle is skipped; the cursor is left unchanged.
    async fn poll_once(
        &self,
        cursor: &Self::Cursor,
    ) -> FreeboxResult<PollOutcome<Self::Event, Self::Cursor>>;
}
