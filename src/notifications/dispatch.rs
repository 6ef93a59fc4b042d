//! Watcher subscribers that turn events into notifications.
//!
//! Watcher callbacks are synchronous, so each one spawns the lookup and
//! delivery on the runtime and returns immediately. Delivery failures are
//! logged, never propagated to the poll loop.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::format::{call_notification, voicemail_notification};
use crate::error::{FreeboxError, FreeboxResult};
use crate::models::CallEntry;
use crate::traits::{IdentityLookup, Notifier};
use crate::watcher::{Callback, VoicemailEvent};

fn current_runtime() -> FreeboxResult<Handle> {
    Handle::try_current().map_err(|_| FreeboxError::NoRuntime)
}

/// Subscriber for the call watcher.
pub fn call_dispatcher(
    notifier: Arc<dyn Notifier>,
    lookup: Arc<dyn IdentityLookup>,
) -> FreeboxResult<Callback<CallEntry>> {
    let runtime = current_runtime()?;
    Ok(Arc::new(move |call: &CallEntry| {
        debug!(id = call.id, number = %call.number, "New call received");
        let call = call.clone();
        let notifier = Arc::clone(&notifier);
        let lookup = Arc::clone(&lookup);
        runtime.spawn(async move {
            let notification = call_notification(&call, lookup.as_ref()).await;
            if let Err(e) = notifier.deliver(&notification).await {
                warn!(id = call.id, error = %e, "Call notification not delivered");
            }
        });
    }))
}

/// Subscriber for the voicemail watcher.
pub fn voicemail_dispatcher(notifier: Arc<dyn Notifier>) -> FreeboxResult<Callback<VoicemailEvent>> {
    let runtime = current_runtime()?;
    Ok(Arc::new(move |event: &VoicemailEvent| {
        debug!(id = %event.voicemail.id, "New voicemail received");
        let notification = voicemail_notification(event);
        let id = event.voicemail.id.clone();
        let notifier = Arc::clone(&notifier);
        runtime.spawn(async move {
            if let Err(e) = notifier.deliver(&notification).await {
                warn!(id = %id, error = %e, "Voicemail notification not delivered");
            }
        });
    }))
}
