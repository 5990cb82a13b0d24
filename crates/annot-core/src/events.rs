//! Host editor event bus contract.
//!
//! The tracker subscribes once when it is built and unsubscribes once when it
//! is torn down. Nothing relies on handlers being dropped implicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kinds of host events the tracker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorEventKind {
    /// Selection or content changed.
    NodeChange,
    /// The editor instance is being torn down.
    Remove,
}

/// An event emitted by the host editor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorEvent {
    NodeChange,
    Remove,
}

impl EditorEvent {
    pub const fn kind(&self) -> EditorEventKind {
        match self {
            Self::NodeChange => EditorEventKind::NodeChange,
            Self::Remove => EditorEventKind::Remove,
        }
    }
}

/// Identifier returned by [`EditorEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Event handler registered with the host.
pub type EventHandler = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

/// Subscription surface of the host editor's event bus.
///
/// Handlers for one kind are invoked in subscription order.
pub trait EditorEvents: Send + Sync {
    /// Registers `handler` for events of `kind`.
    fn subscribe(&self, kind: EditorEventKind, handler: EventHandler) -> SubscriptionId;

    /// Removes a subscription. Returns `false` if it was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
