//! Common test utilities for integration tests.
//!
//! Provides a `Harness` that wires an `AnnotationTracker` to the in-memory
//! document and event bus, plus a `Recorder` capturing listener calls.

use annot_core::{
    ActiveAnnotation, AnnotateError, AnnotationDocument, AnnotationInstance, AnnotationRegistry,
    EditorEvent, EditorEvents, NameRegistry, NodeId, Result,
};
use annot_memdoc::{EventBus, MemoryDocument};
use annot_tracker::{AnnotationTracker, TrackerConfig};
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) const ACTIVE_ATTR: &str = "data-annotation-active";

/// Length of the harness document.
pub(crate) const DOC_LEN: usize = 500;

/// Memory document that counts identification calls and can be made to fail.
pub(crate) struct ProbeDocument {
    pub inner: MemoryDocument,
    identify_calls: AtomicUsize,
    failing: AtomicBool,
}

impl ProbeDocument {
    fn new(len: usize) -> Self {
        Self {
            inner: MemoryDocument::new(len),
            identify_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn identify_calls(&self) -> usize {
        self.identify_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn annotate(&self, name: &str, uid: &str, ranges: &[Range<usize>]) -> Vec<NodeId> {
        self.inner
            .annotate(name, uid, ranges)
            .expect("annotation ranges inside document")
    }

    pub(crate) fn caret(&self, offset: usize) {
        self.inner
            .set_caret(offset)
            .expect("caret inside document");
    }

    pub(crate) fn active_nodes(&self) -> Vec<NodeId> {
        self.inner.nodes_with_attribute(ACTIVE_ATTR)
    }
}

impl AnnotationDocument for ProbeDocument {
    fn identify(&self, name: Option<&str>) -> Result<Option<AnnotationInstance>> {
        self.identify_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AnnotateError::Identification {
                name: name.unwrap_or_default().to_string(),
                source: "document is being rebuilt".into(),
            });
        }
        self.inner.identify(name)
    }

    fn find_markers(&self, uid: &str) -> Vec<NodeId> {
        self.inner.find_markers(uid)
    }

    fn set_attribute(&self, node: NodeId, key: &str, value: &str) -> Result<()> {
        self.inner.set_attribute(node, key, value)
    }

    fn remove_attribute(&self, node: NodeId, key: &str) -> Result<()> {
        self.inner.remove_attribute(node, key)
    }
}

/// One captured listener call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub active: bool,
    pub name: String,
    pub data: Option<ActiveAnnotation>,
}

impl Call {
    pub(crate) fn active(name: &str, uid: &str, nodes: &[NodeId]) -> Self {
        Self {
            active: true,
            name: name.to_string(),
            data: Some(ActiveAnnotation {
                uid: uid.to_string(),
                nodes: nodes.to_vec(),
            }),
        }
    }

    pub(crate) fn inactive(name: &str) -> Self {
        Self {
            active: false,
            name: name.to_string(),
            data: None,
        }
    }
}

/// Shared log of listener calls, optionally tagged per listener.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Arc<Mutex<Vec<(&'static str, Call)>>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for `name` whose calls are tagged `tag`.
    pub(crate) fn listen(&self, tracker: &AnnotationTracker, name: &str, tag: &'static str) {
        let calls = Arc::clone(&self.calls);
        tracker.add_listener(
            name,
            move |active: bool, name: &str, data: Option<&ActiveAnnotation>| {
                calls.lock().push((
                    tag,
                    Call {
                        active,
                        name: name.to_string(),
                        data: data.cloned(),
                    },
                ));
            },
        );
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    #[allow(dead_code)] // Used in listener ordering tests, not all tests
    pub(crate) fn tags(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|(t, _)| *t).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.calls.lock().len()
    }

    #[allow(dead_code)]
    pub(crate) fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Tracker wired to a probe document and an event bus.
pub(crate) struct Harness {
    pub doc: Arc<ProbeDocument>,
    pub bus: Arc<EventBus>,
    pub registry: Arc<NameRegistry>,
    pub tracker: AnnotationTracker,
}

impl Harness {
    pub(crate) fn new(names: &[&str]) -> Self {
        Self::with_config(names, &TrackerConfig::default())
    }

    pub(crate) fn with_config(names: &[&str], config: &TrackerConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();

        let doc = Arc::new(ProbeDocument::new(DOC_LEN));
        let bus = Arc::new(EventBus::new());
        let registry: Arc<NameRegistry> = Arc::new(names.iter().collect());
        let tracker = AnnotationTracker::new(
            config,
            Arc::clone(&registry) as Arc<dyn AnnotationRegistry>,
            Arc::clone(&doc) as Arc<dyn AnnotationDocument>,
            Arc::clone(&bus) as Arc<dyn EditorEvents>,
        );

        Self {
            doc,
            bus,
            registry,
            tracker,
        }
    }

    /// Emits a node-change event, as the host does on every caret move.
    pub(crate) fn node_change(&self) {
        self.bus.emit(&EditorEvent::NodeChange);
    }

    pub(crate) fn remove(&self) {
        self.bus.emit(&EditorEvent::Remove);
    }

    /// Moves the caret and emits a node-change event.
    pub(crate) fn move_caret(&self, offset: usize) {
        self.doc.caret(offset);
        self.node_change();
    }

    /// Number of scans run so far, derived from identification calls.
    pub(crate) fn scans(&self) -> usize {
        self.doc.identify_calls() / self.registry.len().max(1)
    }
}

/// Sleeps on the (usually paused) tokio clock.
pub(crate) async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Waits past one default throttle window.
pub(crate) async fn settle() {
    sleep_ms(40).await;
}
