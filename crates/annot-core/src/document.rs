use crate::error::Result;
use crate::types::{AnnotationInstance, NodeId};

/// Document-side collaborator of the annotation tracker.
///
/// Implementations own the actual document (a browser DOM, a rope with
/// decorations, an in-memory tree) and the user's current selection. The
/// tracker never caches anything returned from here: every scan asks again,
/// so implementations must answer from live state.
///
/// # Examples
///
/// ```
/// use annot_core::{AnnotationDocument, AnnotationInstance, NodeId, Result};
///
/// /// A document with no annotations at all.
/// struct Blank;
///
/// impl AnnotationDocument for Blank {
///     fn identify(&self, _name: Option<&str>) -> Result<Option<AnnotationInstance>> {
///         Ok(None)
///     }
///
///     fn find_markers(&self, _uid: &str) -> Vec<NodeId> {
///         Vec::new()
///     }
///
///     fn set_attribute(&self, _node: NodeId, _key: &str, _value: &str) -> Result<()> {
///         Ok(())
///     }
///
///     fn remove_attribute(&self, _node: NodeId, _key: &str) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// assert!(Blank.identify(Some("comment")).unwrap().is_none());
/// ```
pub trait AnnotationDocument: Send + Sync {
    /// Returns the annotation instance intersecting the current selection.
    ///
    /// With `Some(name)` only annotations of that type are considered; with
    /// `None` any annotation type may match. "Nothing here" is `Ok(None)`,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be inspected consistently.
    /// The tracker does not recover from this; it aborts the scan.
    fn identify(&self, name: Option<&str>) -> Result<Option<AnnotationInstance>>;

    /// Returns every marker node currently tagged with `uid`.
    fn find_markers(&self, uid: &str) -> Vec<NodeId>;

    /// Sets attribute `key` to `value` on `node`.
    fn set_attribute(&self, node: NodeId, key: &str, value: &str) -> Result<()>;

    /// Removes attribute `key` from `node`. Removing a missing attribute is a no-op.
    fn remove_attribute(&self, node: NodeId, key: &str) -> Result<()>;
}
