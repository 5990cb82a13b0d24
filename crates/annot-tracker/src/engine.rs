//! Diff-and-notify engine.
//!
//! Each scan re-identifies the active instance of every registered
//! annotation name and compares it with the uid last reported for that name.
//! Listeners and markers are only touched when the two differ, so repeated
//! scans over an unchanged selection are free of side effects.

use crate::markers::MarkerToggler;
use crate::state::ListenerStore;
use annot_core::{
    ActiveAnnotation, AnnotationDocument, AnnotationInstance, AnnotationRegistry, Result,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A change reported by one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// `uid` became the active instance of `name`.
    ///
    /// `replaced` is the instance it superseded without an intervening
    /// deactivation. Listeners are not told about `replaced`; a new
    /// activation implicitly supersedes the old one.
    Activated {
        name: String,
        uid: String,
        replaced: Option<String>,
    },
    /// The selection left `uid` and no instance of `name` is active.
    Deactivated { name: String, uid: String },
}

impl Transition {
    pub fn name(&self) -> &str {
        match self {
            Self::Activated { name, .. } | Self::Deactivated { name, .. } => name,
        }
    }
}

/// Compares live annotation state against the last reported state.
pub struct ChangeDetector {
    registry: Arc<dyn AnnotationRegistry>,
    document: Arc<dyn AnnotationDocument>,
    store: Arc<ListenerStore>,
    markers: MarkerToggler,
    scanning: Mutex<()>,
    rerun: AtomicBool,
}

impl ChangeDetector {
    pub fn new(
        registry: Arc<dyn AnnotationRegistry>,
        document: Arc<dyn AnnotationDocument>,
        store: Arc<ListenerStore>,
        markers: MarkerToggler,
    ) -> Self {
        Self {
            registry,
            document,
            store,
            markers,
            scanning: Mutex::new(()),
            rerun: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<ListenerStore> {
        &self.store
    }

    /// Runs diff passes over all registered names in lexicographic order.
    ///
    /// Listeners for a name fire synchronously, in registration order, before
    /// the next name is examined. Scans are serialized: a scan requested
    /// while another one holds the guard (from another thread, or from
    /// inside a listener) only records the request and returns no
    /// transitions. The holder runs one more pass for every batch of such
    /// requests before it returns, so the last request is always served
    /// against the document state current at that point. Transitions from
    /// those extra passes are returned to the holder's caller.
    ///
    /// # Errors
    ///
    /// Propagates the first identification or attribute error. Names after
    /// the failing one are left untouched for this pass. Requests already
    /// folded into the failing pass are not retried until the next scan.
    pub fn scan(&self) -> Result<Vec<Transition>> {
        self.rerun.store(true, Ordering::SeqCst);

        let mut transitions = Vec::new();
        loop {
            let Some(guard) = self.scanning.try_lock() else {
                tracing::debug!("Annotation scan already running, requesting another pass");
                return Ok(transitions);
            };
            while self.rerun.swap(false, Ordering::SeqCst) {
                transitions.extend(self.scan_pass()?);
            }
            drop(guard);

            // A request that lost the race against the unlock above.
            if !self.rerun.load(Ordering::SeqCst) {
                return Ok(transitions);
            }
        }
    }

    fn scan_pass(&self) -> Result<Vec<Transition>> {
        let mut names = self.registry.names();
        names.sort();

        let mut transitions = Vec::new();
        for name in &names {
            if let Some(transition) = self.scan_name(name)? {
                tracing::debug!("Annotation transition: {:?}", transition);
                transitions.push(transition);
            }
        }
        Ok(transitions)
    }

    fn scan_name(&self, name: &str) -> Result<Option<Transition>> {
        let current = self.document.identify(Some(name))?;
        let previous = self.store.previous(name);

        match (current, previous) {
            (None, None) => Ok(None),
            (None, Some(uid)) => {
                self.fire_inactive(name);
                self.store.clear_previous(name);
                self.markers.toggle_active(&uid, false)?;
                Ok(Some(Transition::Deactivated {
                    name: name.to_string(),
                    uid,
                }))
            }
            (Some(instance), Some(uid)) if instance.uid == uid => Ok(None),
            (Some(instance), replaced) => {
                if let Some(old) = &replaced {
                    self.markers.toggle_active(old, false)?;
                }
                self.fire_active(name, &instance);
                self.store.set_previous(name, &instance.uid);
                self.markers.toggle_active(&instance.uid, true)?;
                Ok(Some(Transition::Activated {
                    name: name.to_string(),
                    uid: instance.uid,
                    replaced,
                }))
            }
        }
    }

    fn fire_active(&self, name: &str, instance: &AnnotationInstance) {
        let data = ActiveAnnotation::from(instance);
        for listener in self.store.listeners(name) {
            listener(true, name, Some(&data));
        }
    }

    fn fire_inactive(&self, name: &str) {
        for listener in self.store.listeners(name) {
            listener(false, name, None);
        }
    }
}
