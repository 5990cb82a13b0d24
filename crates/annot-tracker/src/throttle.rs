use annot_core::{AnnotateError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

type Action = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Slot {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Trailing-edge throttle around an action.
///
/// Every [`trigger`](Self::trigger) (re)schedules the action to run once,
/// `delay` after the most recent trigger. Any number of triggers inside the
/// window collapse into that single run. [`cancel`](Self::cancel) drops the
/// pending run. The action takes no arguments: it must read whatever state it
/// needs when it runs, not when it was triggered.
///
/// Pending runs are spawned tokio tasks; rescheduling aborts the previous one.
///
/// # Examples
///
/// ```
/// use annot_tracker::throttle::ThrottleGate;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&runs);
/// let gate = ThrottleGate::new(Duration::from_millis(5), move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// gate.trigger().unwrap();
/// gate.trigger().unwrap();
/// tokio::time::sleep(Duration::from_millis(50)).await;
///
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// # }
/// ```
pub struct ThrottleGate {
    delay: Duration,
    action: Action,
    slot: Arc<Mutex<Slot>>,
}

impl ThrottleGate {
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            delay,
            action: Arc::new(action),
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules the action `delay` from now, replacing any pending run.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::RuntimeUnavailable` when called outside a
    /// tokio runtime. Nothing is scheduled and any pending run is kept.
    pub fn trigger(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| AnnotateError::RuntimeUnavailable)?;
        let deadline = Instant::now() + self.delay;

        let mut slot = self.slot.lock();
        if let Some(old) = slot.task.take() {
            old.abort();
        }
        slot.generation += 1;

        let generation = slot.generation;
        let action = Arc::clone(&self.action);
        let shared = Arc::clone(&self.slot);
        slot.task = Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            {
                let mut slot = shared.lock();
                // Superseded after the timer fired but before the abort landed.
                if slot.generation != generation {
                    return;
                }
                slot.task = None;
            }
            action();
        }));
        Ok(())
    }

    /// Drops the pending run, if any, without executing it.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(task) = slot.task.take() {
            tracing::trace!("Cancelling pending throttled run");
            task.abort();
        }
    }

    /// Whether a run is scheduled and has not started yet.
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ThrottleGate {
    fn drop(&mut self) {
        self.cancel();
    }
}
