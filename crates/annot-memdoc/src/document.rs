use annot_core::{
    AnnotateError, AnnotationDocument, AnnotationElement, AnnotationInstance, NodeId, Result,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Range;

/// A marker node wrapping part of an annotated span.
#[derive(Debug, Clone)]
struct MarkerNode {
    id: NodeId,
    uid: String,
    name: String,
    range: Range<usize>,
    attributes: BTreeMap<String, String>,
}

impl MarkerNode {
    fn contains(&self, offset: usize) -> bool {
        self.range.start <= offset && offset < self.range.end
    }
}

#[derive(Debug)]
struct Inner {
    len: usize,
    next_node: u64,
    markers: Vec<MarkerNode>,
    selection: Range<usize>,
}

impl Inner {
    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.len {
            return Err(AnnotateError::InvalidRange {
                start: range.start,
                end: range.end,
                len: self.len,
            });
        }
        Ok(())
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut MarkerNode> {
        self.markers
            .iter_mut()
            .find(|m| m.id == node)
            .ok_or(AnnotateError::UnknownNode(node))
    }

    /// Marker nodes for `uid`, ordered by position in the document.
    fn markers_for(&self, uid: &str) -> Vec<&MarkerNode> {
        let mut found: Vec<&MarkerNode> = self.markers.iter().filter(|m| m.uid == uid).collect();
        found.sort_by_key(|m| (m.range.start, m.id));
        found
    }
}

/// In-memory annotated document.
///
/// Models a flat text of `len` characters, a selection, and annotation spans
/// materialized as marker nodes (one per annotated range, like inline wrapper
/// elements in a DOM). Marker nodes carry string attributes so the active
/// state toggled by the tracker can be observed.
///
/// Identification looks at the selection start: the innermost marker
/// containing that offset wins. Nested annotations are therefore reported
/// before the annotations enclosing them.
///
/// # Examples
///
/// ```
/// use annot_core::AnnotationDocument;
/// use annot_memdoc::MemoryDocument;
///
/// let doc = MemoryDocument::new(100);
/// doc.annotate("comment", "c-1", &[10..20]).unwrap();
///
/// doc.set_caret(15).unwrap();
/// let found = doc.identify(Some("comment")).unwrap().unwrap();
/// assert_eq!(found.uid, "c-1");
///
/// doc.set_caret(50).unwrap();
/// assert!(doc.identify(Some("comment")).unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct MemoryDocument {
    inner: RwLock<Inner>,
}

impl MemoryDocument {
    /// Creates an empty document of `len` characters with the caret at 0.
    pub fn new(len: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                len,
                next_node: 1,
                markers: Vec::new(),
                selection: 0..0,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wraps each of `ranges` in a marker node for annotation `uid` of type `name`.
    ///
    /// Returns the created nodes in the order of `ranges`. Calling this again
    /// with an existing uid adds more nodes to the same instance.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::InvalidRange` if any range falls outside the
    /// document. No node is created in that case.
    pub fn annotate(&self, name: &str, uid: &str, ranges: &[Range<usize>]) -> Result<Vec<NodeId>> {
        let mut inner = self.inner.write();
        for range in ranges {
            inner.check_range(range)?;
        }

        let mut created = Vec::with_capacity(ranges.len());
        for range in ranges {
            let id = NodeId::new(inner.next_node);
            inner.next_node += 1;
            inner.markers.push(MarkerNode {
                id,
                uid: uid.to_string(),
                name: name.to_string(),
                range: range.clone(),
                attributes: BTreeMap::new(),
            });
            created.push(id);
        }

        tracing::debug!(
            "Annotated {} range(s) as {} ({})",
            created.len(),
            name,
            uid
        );
        Ok(created)
    }

    /// Removes every marker node of `uid`. Returns how many were removed.
    pub fn remove_annotation(&self, uid: &str) -> usize {
        let mut inner = self.inner.write();
        let before = inner.markers.len();
        inner.markers.retain(|m| m.uid != uid);
        before - inner.markers.len()
    }

    /// Sets the selection to `range`.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::InvalidRange` if `range` falls outside the document.
    pub fn set_selection(&self, range: Range<usize>) -> Result<()> {
        let mut inner = self.inner.write();
        inner.check_range(&range)?;
        inner.selection = range;
        Ok(())
    }

    /// Collapses the selection to a caret at `offset`.
    pub fn set_caret(&self, offset: usize) -> Result<()> {
        self.set_selection(offset..offset)
    }

    pub fn selection(&self) -> Range<usize> {
        self.inner.read().selection.clone()
    }

    /// Value of attribute `key` on `node`, if both exist.
    pub fn attribute(&self, node: NodeId, key: &str) -> Option<String> {
        let inner = self.inner.read();
        inner
            .markers
            .iter()
            .find(|m| m.id == node)
            .and_then(|m| m.attributes.get(key).cloned())
    }

    /// All nodes carrying attribute `key`, in creation order.
    pub fn nodes_with_attribute(&self, key: &str) -> Vec<NodeId> {
        let inner = self.inner.read();
        inner
            .markers
            .iter()
            .filter(|m| m.attributes.contains_key(key))
            .map(|m| m.id)
            .collect()
    }
}

impl AnnotationDocument for MemoryDocument {
    fn identify(&self, name: Option<&str>) -> Result<Option<AnnotationInstance>> {
        let inner = self.inner.read();
        let offset = inner.selection.start;

        // Innermost marker wins; among equal spans the most recently created.
        let hit = inner
            .markers
            .iter()
            .filter(|m| name.is_none_or(|n| m.name == n))
            .filter(|m| m.contains(offset))
            .min_by_key(|m| (m.range.len(), std::cmp::Reverse(m.id)));

        let Some(hit) = hit else {
            return Ok(None);
        };

        let elements = inner
            .markers_for(&hit.uid)
            .into_iter()
            .map(|m| AnnotationElement::new(m.id))
            .collect();

        Ok(Some(AnnotationInstance::new(
            hit.uid.clone(),
            hit.name.clone(),
            elements,
        )))
    }

    fn find_markers(&self, uid: &str) -> Vec<NodeId> {
        let inner = self.inner.read();
        inner.markers_for(uid).into_iter().map(|m| m.id).collect()
    }

    fn set_attribute(&self, node: NodeId, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner
            .node_mut(node)?
            .attributes
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, node: NodeId, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.node_mut(node)?.attributes.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = MemoryDocument::new(10);
        assert_eq!(doc.len(), 10);
        assert!(!doc.is_empty());
        assert_eq!(doc.selection(), 0..0);
    }

    #[test]
    fn test_annotate_out_of_bounds() {
        let doc = MemoryDocument::new(10);
        let result = doc.annotate("comment", "c-1", &[0..4, 8..12]);
        assert!(matches!(
            result,
            Err(AnnotateError::InvalidRange {
                start: 8,
                end: 12,
                len: 10
            })
        ));
        assert!(doc.find_markers("c-1").is_empty());
    }

    #[test]
    fn test_selection_out_of_bounds() {
        let doc = MemoryDocument::new(10);
        assert!(doc.set_caret(11).is_err());
        assert!(doc.set_selection(5..3).is_err());
        assert_eq!(doc.selection(), 0..0);
    }

    #[test]
    fn test_identify_by_name() {
        let doc = MemoryDocument::new(100);
        doc.annotate("comment", "c-1", &[10..20]).unwrap();
        doc.annotate("suggestion", "s-1", &[10..20]).unwrap();
        doc.set_caret(12).unwrap();

        let comment = doc.identify(Some("comment")).unwrap().unwrap();
        assert_eq!(comment.uid, "c-1");
        assert_eq!(comment.name, "comment");

        let suggestion = doc.identify(Some("suggestion")).unwrap().unwrap();
        assert_eq!(suggestion.uid, "s-1");

        assert!(doc.identify(Some("highlight")).unwrap().is_none());
    }

    #[test]
    fn test_identify_any_name_prefers_innermost() {
        let doc = MemoryDocument::new(100);
        doc.annotate("comment", "outer", &[0..50]).unwrap();
        doc.annotate("suggestion", "inner", &[20..30]).unwrap();

        doc.set_caret(25).unwrap();
        assert_eq!(doc.identify(None).unwrap().unwrap().uid, "inner");

        doc.set_caret(40).unwrap();
        assert_eq!(doc.identify(None).unwrap().unwrap().uid, "outer");
    }

    #[test]
    fn test_identify_span_end_is_exclusive() {
        let doc = MemoryDocument::new(100);
        doc.annotate("comment", "c-1", &[10..20]).unwrap();

        doc.set_caret(10).unwrap();
        assert!(doc.identify(Some("comment")).unwrap().is_some());

        doc.set_caret(20).unwrap();
        assert!(doc.identify(Some("comment")).unwrap().is_none());
    }

    #[test]
    fn test_identify_uses_selection_start() {
        let doc = MemoryDocument::new(100);
        doc.annotate("comment", "c-1", &[10..20]).unwrap();

        doc.set_selection(15..60).unwrap();
        assert!(doc.identify(Some("comment")).unwrap().is_some());

        doc.set_selection(5..15).unwrap();
        assert!(doc.identify(Some("comment")).unwrap().is_none());
    }

    #[test]
    fn test_identify_returns_all_elements_in_document_order() {
        let doc = MemoryDocument::new(100);
        let first = doc.annotate("comment", "c-1", &[40..50]).unwrap();
        let second = doc.annotate("comment", "c-1", &[10..20]).unwrap();

        doc.set_caret(45).unwrap();
        let instance = doc.identify(Some("comment")).unwrap().unwrap();
        assert_eq!(instance.nodes(), vec![second[0], first[0]]);
    }

    #[test]
    fn test_attributes() {
        let doc = MemoryDocument::new(100);
        let nodes = doc.annotate("comment", "c-1", &[10..20, 30..40]).unwrap();

        doc.set_attribute(nodes[0], "data-state", "on").unwrap();
        assert_eq!(doc.attribute(nodes[0], "data-state").as_deref(), Some("on"));
        assert_eq!(doc.attribute(nodes[1], "data-state"), None);
        assert_eq!(doc.nodes_with_attribute("data-state"), vec![nodes[0]]);

        doc.remove_attribute(nodes[0], "data-state").unwrap();
        assert!(doc.nodes_with_attribute("data-state").is_empty());

        // Removing twice is fine.
        doc.remove_attribute(nodes[0], "data-state").unwrap();
    }

    #[test]
    fn test_attribute_on_unknown_node() {
        let doc = MemoryDocument::new(10);
        let result = doc.set_attribute(NodeId::new(99), "k", "v");
        assert!(matches!(result, Err(AnnotateError::UnknownNode(_))));
    }

    #[test]
    fn test_remove_annotation() {
        let doc = MemoryDocument::new(100);
        doc.annotate("comment", "c-1", &[10..20, 30..40]).unwrap();
        doc.annotate("comment", "c-2", &[50..60]).unwrap();

        assert_eq!(doc.remove_annotation("c-1"), 2);
        assert!(doc.find_markers("c-1").is_empty());
        assert_eq!(doc.find_markers("c-2").len(), 1);
        assert_eq!(doc.remove_annotation("c-1"), 0);
    }
}
