use annot_core::ActiveAnnotation;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Callback invoked when the active annotation of a name changes.
///
/// Arguments are `(is_active, name, data)`. `data` is present exactly when
/// `is_active` is `true`.
pub type Listener = Arc<dyn Fn(bool, &str, Option<&ActiveAnnotation>) + Send + Sync>;

/// Tracked state for one annotation name.
#[derive(Clone, Default)]
pub struct NameState {
    /// Listeners in registration order.
    pub listeners: Vec<Listener>,
    /// Uid last reported active to `listeners`, if any.
    pub previous: Option<String>,
}

impl fmt::Debug for NameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameState")
            .field("listeners", &self.listeners.len())
            .field("previous", &self.previous)
            .finish()
    }
}

/// Per-name listener lists and active-uid slots.
///
/// Entries are created on first access and live until [`clear`](Self::clear).
/// Only the listener registry API appends listeners and only the change
/// engine writes `previous`; everything else is read-only.
///
/// Accessors clone what they return and release the map entry before
/// returning, so no lock is held while callers run listeners.
///
/// # Examples
///
/// ```
/// use annot_core::ActiveAnnotation;
/// use annot_tracker::state::{Listener, ListenerStore};
/// use std::sync::Arc;
///
/// let store = ListenerStore::new();
/// let listener: Listener = Arc::new(|active: bool, name: &str, _: Option<&ActiveAnnotation>| {
///     println!("{name}: {active}");
/// });
/// store.add_listener("comment", Arc::clone(&listener));
/// store.add_listener("comment", listener);
///
/// assert_eq!(store.listener_count("comment"), 2);
/// assert_eq!(store.previous("comment"), None);
/// ```
pub struct ListenerStore {
    states: DashMap<String, NameState>,
}

impl ListenerStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Appends `listener` to the list for `name`.
    ///
    /// No deduplication: registering the same callback twice makes it fire twice.
    pub fn add_listener(&self, name: &str, listener: Listener) {
        self.states
            .entry(name.to_string())
            .or_default()
            .listeners
            .push(listener);
    }

    /// Snapshot of the listeners for `name`, in registration order.
    pub fn listeners(&self, name: &str) -> Vec<Listener> {
        self.states
            .entry(name.to_string())
            .or_default()
            .listeners
            .clone()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.states.get(name).map_or(0, |s| s.listeners.len())
    }

    /// Uid last reported active for `name`.
    pub fn previous(&self, name: &str) -> Option<String> {
        self.states
            .entry(name.to_string())
            .or_default()
            .previous
            .clone()
    }

    pub(crate) fn set_previous(&self, name: &str, uid: &str) {
        self.states.entry(name.to_string()).or_default().previous = Some(uid.to_string());
    }

    pub(crate) fn clear_previous(&self, name: &str) -> Option<String> {
        self.states
            .get_mut(name)
            .and_then(|mut state| state.previous.take())
    }

    /// Number of names with state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drops all state. Called when the owning tracker is torn down.
    pub fn clear(&self) {
        self.states.clear();
    }
}

impl Default for ListenerStore {
    fn default() -> Self {
        Self::new()
    }
}
