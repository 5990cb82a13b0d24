//! In-memory backend for annot-watch.
//!
//! Provides a document model and an event bus implementing the annot-core
//! collaborator traits, so the tracker can run without a real editor. Used by
//! the tracker's integration tests and benchmarks, and by hosts that keep
//! their annotation layout outside any DOM.
//!
//! # Examples
//!
//! ```
//! use annot_core::{AnnotationDocument, EditorEvent};
//! use annot_memdoc::{EventBus, MemoryDocument};
//!
//! let doc = MemoryDocument::new(64);
//! doc.annotate("comment", "c-1", &[4..12]).unwrap();
//! doc.set_caret(6).unwrap();
//! assert!(doc.identify(Some("comment")).unwrap().is_some());
//!
//! let bus = EventBus::new();
//! assert_eq!(bus.emit(&EditorEvent::NodeChange), 0);
//! ```

pub mod document;
pub mod events;

// Re-export commonly used types
pub use document::MemoryDocument;
pub use events::EventBus;
