//! Annotation change tracking for document editors.
//!
//! Watches which annotation of each registered type intersects the editor
//! selection and notifies listeners exactly when that changes. The host
//! supplies the document, the name registry and its event bus through the
//! annot-core traits.
//!
//! # Architecture
//!
//! - `state`: per-name listener lists and last-reported uid
//! - `markers`: active attribute toggling on marker nodes
//! - `engine`: the diff-and-notify pass over all names
//! - `throttle`: trailing-edge coalescing of scan requests
//! - `tracker`: wires the above to host events

pub mod config;
pub mod engine;
pub mod markers;
pub mod state;
pub mod throttle;
pub mod tracker;

mod test_utils;

// Re-export commonly used types
pub use annot_core::{AnnotateError, Result};
pub use config::{MarkerConfig, ThrottleConfig, TrackerConfig};
pub use engine::{ChangeDetector, Transition};
pub use state::{Listener, ListenerStore};
pub use throttle::ThrottleGate;
pub use tracker::AnnotationTracker;
