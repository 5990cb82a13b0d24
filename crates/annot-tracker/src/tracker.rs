use crate::config::TrackerConfig;
use crate::engine::{ChangeDetector, Transition};
use crate::markers::MarkerToggler;
use crate::state::{Listener, ListenerStore};
use crate::throttle::ThrottleGate;
use annot_core::{
    ActiveAnnotation, AnnotationDocument, AnnotationRegistry, EditorEvent, EditorEventKind,
    EditorEvents, EventHandler, Result, SubscriptionId,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks which annotation of each type intersects the editor selection.
///
/// On construction the tracker subscribes to the host's node-change events
/// (each one triggers a throttled scan) and to its remove event (which
/// cancels any pending scan). [`teardown`](Self::teardown) undoes both
/// subscriptions; it also runs on drop.
///
/// # Examples
///
/// ```
/// use annot_core::{EditorEvent, NameRegistry};
/// use annot_memdoc::{EventBus, MemoryDocument};
/// use annot_tracker::{AnnotationTracker, TrackerConfig};
/// use std::sync::Arc;
///
/// let registry = Arc::new(NameRegistry::from_iter(["comment"]));
/// let doc = Arc::new(MemoryDocument::new(100));
/// let bus = Arc::new(EventBus::new());
///
/// let tracker = AnnotationTracker::new(
///     &TrackerConfig::default(),
///     registry,
///     doc.clone(),
///     bus.clone(),
/// );
/// tracker.add_listener("comment", |active, name, data| {
///     println!("{name}: active={active} uid={:?}", data.map(|d| &d.uid));
/// });
///
/// doc.annotate("comment", "c-1", &[10..20]).unwrap();
/// doc.set_caret(15).unwrap();
///
/// // Hosts normally emit events and let the throttle schedule the scan.
/// let transitions = tracker.scan_now().unwrap();
/// assert_eq!(transitions.len(), 1);
/// assert_eq!(tracker.active_uid("comment").as_deref(), Some("c-1"));
///
/// tracker.teardown();
/// assert_eq!(bus.emit(&EditorEvent::NodeChange), 0);
/// ```
pub struct AnnotationTracker {
    detector: Arc<ChangeDetector>,
    gate: Arc<ThrottleGate>,
    events: Arc<dyn EditorEvents>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
    torn_down: AtomicBool,
}

impl AnnotationTracker {
    pub fn new(
        config: &TrackerConfig,
        registry: Arc<dyn AnnotationRegistry>,
        document: Arc<dyn AnnotationDocument>,
        events: Arc<dyn EditorEvents>,
    ) -> Self {
        let store = Arc::new(ListenerStore::new());
        let markers = MarkerToggler::new(Arc::clone(&document), config.markers.clone());
        let detector = Arc::new(ChangeDetector::new(registry, document, store, markers));

        let scanner = Arc::clone(&detector);
        let gate = Arc::new(ThrottleGate::new(config.throttle.delay(), move || {
            if let Err(e) = scanner.scan() {
                tracing::error!("Annotation scan failed: {}", e);
            }
        }));

        let on_change: EventHandler = {
            let gate = Arc::clone(&gate);
            Arc::new(move |_: &EditorEvent| {
                if let Err(e) = gate.trigger() {
                    tracing::warn!("Failed to schedule annotation scan: {}", e);
                }
            })
        };
        let on_remove: EventHandler = {
            let gate = Arc::clone(&gate);
            Arc::new(move |_: &EditorEvent| gate.cancel())
        };

        let subscriptions = vec![
            events.subscribe(EditorEventKind::NodeChange, on_change),
            events.subscribe(EditorEventKind::Remove, on_remove),
        ];
        tracing::debug!(
            "Annotation tracker attached with {}ms throttle",
            config.throttle.delay_ms
        );

        Self {
            detector,
            gate,
            events,
            subscriptions: Mutex::new(subscriptions),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Registers a callback for changes of the active `name` annotation.
    ///
    /// Callbacks receive `(true, name, Some(data))` when an instance becomes
    /// active (including a direct switch from another instance of the same
    /// name) and `(false, name, None)` when the selection leaves all
    /// instances of `name`. Unknown names are accepted. Ignored after
    /// teardown.
    pub fn add_listener<F>(&self, name: &str, listener: F)
    where
        F: Fn(bool, &str, Option<&ActiveAnnotation>) + Send + Sync + 'static,
    {
        if self.is_torn_down() {
            tracing::debug!("Ignoring listener for {} on detached tracker", name);
            return;
        }
        let listener: Listener = Arc::new(listener);
        self.detector.store().add_listener(name, listener);
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.detector.store().listener_count(name)
    }

    /// Uid of the instance last reported active for `name`.
    pub fn active_uid(&self, name: &str) -> Option<String> {
        self.detector.store().previous(name)
    }

    /// Runs a scan immediately, bypassing the throttle.
    ///
    /// Does nothing after teardown.
    pub fn scan_now(&self) -> Result<Vec<Transition>> {
        if self.is_torn_down() {
            return Ok(Vec::new());
        }
        self.detector.scan()
    }

    /// Schedules a throttled scan, as a node-change event would.
    pub fn trigger(&self) -> Result<()> {
        if self.is_torn_down() {
            return Ok(());
        }
        self.gate.trigger()
    }

    /// Cancels a pending throttled scan.
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.gate.is_pending()
    }

    /// Detaches the tracker from the host.
    ///
    /// Cancels any pending scan, removes both event subscriptions and drops
    /// all listener state. Idempotent.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.gate.cancel();
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        for id in subscriptions {
            if !self.events.unsubscribe(id) {
                tracing::debug!("Subscription {} was already removed", id);
            }
        }
        self.detector.store().clear();
        tracing::debug!("Annotation tracker detached");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

impl Drop for AnnotationTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}
