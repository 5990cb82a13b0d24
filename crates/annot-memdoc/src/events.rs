use annot_core::{EditorEvent, EditorEventKind, EditorEvents, EventHandler, SubscriptionId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

struct Subscription {
    id: SubscriptionId,
    kind: EditorEventKind,
    handler: EventHandler,
}

/// Synchronous in-process event bus.
///
/// `emit` dispatches to every handler subscribed for the event's kind, in
/// subscription order, on the calling thread. Handlers are collected before
/// any of them runs, so a handler may subscribe or unsubscribe re-entrantly;
/// such changes apply from the next `emit`.
///
/// # Examples
///
/// ```
/// use annot_core::{EditorEvent, EditorEventKind, EditorEvents};
/// use annot_memdoc::EventBus;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let bus = EventBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&seen);
/// let id = bus.subscribe(
///     EditorEventKind::NodeChange,
///     Arc::new(move |_: &EditorEvent| {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
/// );
///
/// assert_eq!(bus.emit(&EditorEvent::NodeChange), 1);
/// assert!(bus.unsubscribe(id));
/// assert_eq!(bus.emit(&EditorEvent::NodeChange), 0);
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct EventBus {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    /// Dispatches `event` and returns how many handlers ran.
    pub fn emit(&self, event: &EditorEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| EventHandler::clone(&s.handler))
            .collect();

        tracing::trace!("Dispatching {:?} to {} handler(s)", kind, handlers.len());
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EditorEventKind) -> usize {
        self.subscriptions
            .read()
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorEvents for EventBus {
    fn subscribe(&self, kind: EditorEventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .write()
            .push(Subscription { id, kind, handler });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }
}
