//! Core abstractions for annot-watch.
//!
//! This crate provides the types and collaborator traits shared by the
//! annotation tracker and the document backends that drive it.
//!
//! # Architecture
//!
//! annot-core defines:
//! - **Types**: `NodeId`, `AnnotationElement`, `AnnotationInstance`, `ActiveAnnotation`
//! - **Traits**: `AnnotationRegistry`, `AnnotationDocument`, `EditorEvents`
//! - **Registry**: `NameRegistry`, a concurrent set of annotation type names
//! - **Error Types**: `AnnotateError` and the `Result` alias
//!
//! # Examples
//!
//! ```
//! use annot_core::{AnnotationInstance, AnnotationRegistry, NameRegistry, NodeId};
//!
//! let registry = NameRegistry::new();
//! registry.register("comment");
//!
//! let instance = AnnotationInstance::new("c-1", "comment", vec![NodeId::new(1).into()]);
//! assert_eq!(instance.nodes(), vec![NodeId::new(1)]);
//! assert_eq!(registry.names(), vec!["comment"]);
//! ```

pub mod document;
pub mod error;
pub mod events;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use document::AnnotationDocument;
pub use error::{AnnotateError, Result};
pub use events::{EditorEvent, EditorEventKind, EditorEvents, EventHandler, SubscriptionId};
pub use registry::{AnnotationRegistry, NameRegistry};
pub use types::{ActiveAnnotation, AnnotationElement, AnnotationInstance, NodeId};
