//! Subscriber set plus the background task that polls for it.
//!
//! The poll task runs if and only if at least one callback is subscribed.
//! Subscribing the first callback spawns it; unsubscribing the last one
//! aborts it. Both transitions happen under the subscriber lock, so
//! interleaved calls never leave a task behind or start two.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::poller::Poller;
use crate::error::{FreeboxError, FreeboxResult};

/// A subscriber callback. Identity is the allocation behind the `Arc`:
/// subscribing a clone of the same `Arc` twice stores it once.
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

fn callback_id<E>(callback: &Callback<E>) -> usize {
    Arc::as_ptr(callback) as *const () as usize
}

struct State<E> {
    subscribers: Vec<(usize, Callback<E>)>,
    task: Option<JoinHandle<()>>,
}

impl<E> State<E> {
    fn task_alive(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

/// Generic subscribe/poll/notify engine.
pub struct Watcher<P: Poller> {
    poller: Arc<P>,
    interval: Duration,
    runtime: Handle,
    state: Arc<Mutex<State<P::Event>>>,
}

impl<P: Poller> Watcher<P> {
    /// Create a watcher on the current tokio runtime.
    ///
    /// # Errors
    /// [`FreeboxError::NoRuntime`] when called outside a runtime.
    pub fn new(poller: P, interval: Duration) -> FreeboxResult<Self> {
        let runtime = Handle::try_current().map_err(|_| FreeboxError::NoRuntime)?;
        Ok(Self::with_runtime(poller, interval, runtime))
    }

    /// Create a watcher whose task runs on `runtime`.
    pub fn with_runtime(poller: P, interval: Duration, runtime: Handle) -> Self {
        Self {
            poller: Arc::new(poller),
            interval,
            runtime,
            state: Arc::new(Mutex::new(State {
                subscribers: Vec::new(),
                task: None,
            })),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn poller(&self) -> &P {
        &self.poller
    }

    /// Add `callback`. Returns `false` if it was already subscribed.
    pub fn subscribe(&self, callback: Callback<P::Event>) -> bool {
        let id = callback_id(&callback);
        let mut state = lock(&self.state);

        if state.subscribers.iter().any(|(existing, _)| *existing == id) {
            tracing::debug!(poller = self.poller.name(), "Callback already subscribed");
            return false;
        }
        state.subscribers.push((id, callback));

        if !state.task_alive() {
            if state.task.is_some() {
                tracing::warn!(poller = self.poller.name(), "Poll task had died, restarting");
            }
            state.task = Some(self.spawn_task());
        }
        true
    }

    /// Remove `callback`. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, callback: &Callback<P::Event>) -> bool {
        let id = callback_id(callback);
        let mut state = lock(&self.state);

        let before = state.subscribers.len();
        state.subscribers.retain(|(existing, _)| *existing != id);
        if state.subscribers.len() == before {
            tracing::warn!(poller = self.poller.name(), "Unsubscribe: callback not found");
            return false;
        }

        if state.subscribers.is_empty() {
            if let Some(task) = state.task.take() {
                task.abort();
                tracing::info!(poller = self.poller.name(), "Watcher stopped");
            }
        }
        true
    }

    /// Whether the background poll task is alive. A task that ended because
    /// the poller panicked does not count.
    pub fn is_running(&self) -> bool {
        lock(&self.state).task_alive()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Drop every subscriber and stop the task.
    pub fn shutdown(&self) {
        let mut state = lock(&self.state);
        state.subscribers.clear();
        if let Some(task) = state.task.take() {
            task.abort();
            tracing::info!(poller = self.poller.name(), "Watcher shut down");
        }
    }

    fn spawn_task(&self) -> JoinHandle<()> {
        let poller = Arc::clone(&self.poller);
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        self.runtime.spawn(run(poller, state, interval))
    }
}

impl<P: Poller> Drop for Watcher<P> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.state).task.take() {
            task.abort();
        }
    }
}

impl<P: Poller> std::fmt::Debug for Watcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("poller", &self.poller.name())
            .field("interval", &self.interval)
            .field("subscribers", &self.subscriber_count())
            .field("running", &self.is_running())
            .finish()
    }
}

fn lock<E>(state: &Mutex<State<E>>) -> MutexGuard<'_, State<E>> {
    state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn snapshot<E>(state: &Mutex<State<E>>) -> Vec<Callback<E>> {
    lock(state)
        .subscribers
        .iter()
        .map(|(_, callback)| Arc::clone(callback))
        .collect()
}

async fn run<P: Poller>(poller: Arc<P>, state: Arc<Mutex<State<P::Event>>>, interval: Duration) {
    tracing::info!(
        poller = poller.name(),
        "Watcher started (interval: {}ms)",
        interval.as_millis()
    );

    let mut cursor = P::Cursor::default();

    loop {
        match poller.poll_once(&cursor).await {
            Ok(outcome) => {
                if outcome.events.is_empty() {
                    tracing::trace!(poller = poller.name(), "Nothing new");
                } else {
                    tracing::debug!(
                        poller = poller.name(),
                        count = outcome.events.len(),
                        "Dispatching events"
                    );
                    let callbacks = snapshot(&state);
                    for event in &outcome.events {
                        for callback in &callbacks {
                            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                                tracing::warn!(poller = poller.name(), "Subscriber panicked");
                            }
                        }
                    }
                }
                cursor = outcome.cursor;
            }
            Err(e) => {
                tracing::warn!(
                    poller = poller.name(),
                    code = e.error_code(),
                    "Poll failed: {}",
                    e
                );
            }
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::PollOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Emits the cycle number as its only event.
    struct TickPoller;

    #[async_trait]
    impl Poller for TickPoller {
        type Event = u64;
        type Cursor = u64;

        fn name(&self) -> &'static str {
            "tick"
        }

        async fn poll_once(&self, cursor: &u64) -> FreeboxResult<PollOutcome<u64, u64>> {
            Ok(PollOutcome::new(vec![*cursor], cursor + 1))
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Callback<u64>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let callback: Callback<u64> = Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let result = Watcher::new(TickPoller, Duration::from_millis(1));
        assert!(matches!(result, Err(FreeboxError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_task_follows_subscriber_set() {
        let watcher = Watcher::new(TickPoller, Duration::from_millis(5)).unwrap();
        assert!(!watcher.is_running());

        let (_, a) = counter();
        let (_, b) = counter();

        assert!(watcher.subscribe(Arc::clone(&a)));
        assert!(watcher.is_running());
        assert!(watcher.subscribe(Arc::clone(&b)));
        assert!(watcher.unsubscribe(&a));
        assert!(watcher.is_running());
        assert!(watcher.unsubscribe(&b));
        assert!(!watcher.is_running());

        // restart after going idle
        assert!(watcher.subscribe(a));
        assert!(watcher.is_running());
    }

    #[tokio::test]
    async fn test_same_callback_stored_once() {
        let watcher = Watcher::new(TickPoller, Duration::from_millis(5)).unwrap();
        let (_, a) = counter();

        assert!(watcher.subscribe(Arc::clone(&a)));
        assert!(!watcher.subscribe(Arc::clone(&a)));
        assert_eq!(watcher.subscriber_count(), 1);
        assert!(watcher.unsubscribe(&a));
        assert!(!watcher.is_running());
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_reports_not_found() {
        let watcher = Watcher::new(TickPoller, Duration::from_millis(5)).unwrap();
        let (_, a) = counter();
        assert!(!watcher.unsubscribe(&a));
        assert!(!watcher.is_running());
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let watcher = Watcher::new(TickPoller, Duration::from_millis(1)).unwrap();
        let (count, a) = counter();
        watcher.subscribe(a);

        tokio::time::timeout(Duration::from_secs(5), async {
            while count.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        watcher.shutdown();
        assert!(!watcher.is_running());
        assert_eq!(watcher.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_stop_others() {
        let watcher = Watcher::new(TickPoller, Duration::from_millis(1)).unwrap();
        let bad: Callback<u64> = Arc::new(|_| panic!("subscriber failure"));
        let (count, good) = counter();
        watcher.subscribe(bad);
        watcher.subscribe(good);

        tokio::time::timeout(Duration::from_secs(5), async {
            while count.load(Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        assert!(watcher.is_running());
    }

    /// Fails on cycle `fail_on` and records every cursor it is given.
    struct FlakyPoller {
        fail_on: usize,
        cycles: AtomicUsize,
        cursors: Arc<Mutex<Vec<u64>>>,
    }

    #[async_trait]
    impl Poller for FlakyPoller {
        type Event = u64;
        type Cursor = u64;

        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn poll_once(&self, cursor: &u64) -> FreeboxResult<PollOutcome<u64, u64>> {
            self.cursors.lock().unwrap().push(*cursor);
            let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
            if cycle == self.fail_on {
                return Err(FreeboxError::Config("appliance went away".to_string()));
            }
            Ok(PollOutcome::new(vec![*cursor], cursor + 1))
        }
    }

    struct PanickingPoller;

    #[async_trait]
    impl Poller for PanickingPoller {
        type Event = u64;
        type Cursor = u64;

        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn poll_once(&self, _cursor: &u64) -> FreeboxResult<PollOutcome<u64, u64>> {
            panic!("poller failure");
        }
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_cursor_and_task() {
        let cursors = Arc::new(Mutex::new(Vec::new()));
        let watcher = Watcher::new(
            FlakyPoller {
                fail_on: 2,
                cycles: AtomicUsize::new(0),
                cursors: Arc::clone(&cursors),
            },
            Duration::from_millis(1),
        )
        .unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        watcher.subscribe(Arc::new(move |event: &u64| sink.lock().unwrap().push(*event)));

        tokio::time::timeout(Duration::from_secs(5), async {
            while events.lock().unwrap().len() < 3 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        assert!(watcher.is_running());
        assert_eq!(cursors.lock().unwrap()[..4], [0, 1, 1, 2]);
        assert_eq!(events.lock().unwrap()[..3], [0, 1, 2]);
        watcher.shutdown();
    }

    #[tokio::test]
    async fn test_panicked_poll_task_is_not_running() {
        let watcher = Watcher::new(PanickingPoller, Duration::from_millis(1)).unwrap();
        let (_, a) = counter();
        let (_, b) = counter();
        watcher.subscribe(a);

        tokio::time::timeout(Duration::from_secs(5), async {
            while watcher.is_running() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(watcher.subscriber_count(), 1);

        // the next subscriber brings the task back
        assert!(watcher.subscribe(b));
        assert!(watcher.is_running());
        watcher.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_subscribe_unsubscribe() {
        let watcher = Arc::new(Watcher::new(TickPoller, Duration::from_millis(1)).unwrap());

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let watcher = Arc::clone(&watcher);
                tokio::spawn(async move {
                    let (_, callback) = counter();
                    for _ in 0..50 {
                        assert!(watcher.subscribe(Arc::clone(&callback)));
                        tokio::task::yield_now().await;
                        assert!(watcher.unsubscribe(&callback));
                    }
                    if worker % 2 == 0 {
                        watcher.subscribe(callback);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.unwrap();
        }

        assert_eq!(watcher.subscriber_count(), 4);
        assert_eq!(watcher.is_running(), watcher.subscriber_count() > 0);
        watcher.shutdown();
        assert_eq!(watcher.is_running(), watcher.subscriber_count() > 0);
    }
}
