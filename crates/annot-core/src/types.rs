use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a node in the host document.
///
/// Handles are only meaningful to the backend that issued them. Two handles
/// compare equal if and only if they refer to the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One document node that makes up part of an annotation instance.
///
/// Backends may wrap extra per-node information here in the future; listeners
/// only ever see the raw [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationElement {
    node: NodeId,
}

impl AnnotationElement {
    pub const fn new(node: NodeId) -> Self {
        Self { node }
    }

    /// The underlying document node.
    pub const fn node(&self) -> NodeId {
        self.node
    }
}

impl From<NodeId> for AnnotationElement {
    fn from(node: NodeId) -> Self {
        Self::new(node)
    }
}

/// A concrete occurrence of an annotation in the document.
///
/// Returned by [`AnnotationDocument::identify`](crate::AnnotationDocument::identify).
/// The `uid` is stable across identification calls: the same logical
/// occurrence always reports the same uid even if its node set was recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInstance {
    pub uid: String,
    pub name: String,
    pub elements: Vec<AnnotationElement>,
}

impl AnnotationInstance {
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        elements: Vec<AnnotationElement>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            elements,
        }
    }

    /// Raw node handles of every element, in document order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.elements.iter().map(AnnotationElement::node).collect()
    }
}

/// Payload handed to listeners when an annotation becomes active.
///
/// # Examples
///
/// ```
/// use annot_core::{ActiveAnnotation, NodeId};
///
/// let data = ActiveAnnotation {
///     uid: "a1".into(),
///     nodes: vec![NodeId::new(3), NodeId::new(4)],
/// };
///
/// let json = serde_json::to_string(&data).unwrap();
/// assert_eq!(json, r#"{"uid":"a1","nodes":[3,4]}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAnnotation {
    pub uid: String,
    pub nodes: Vec<NodeId>,
}

impl From<&AnnotationInstance> for ActiveAnnotation {
    fn from(instance: &AnnotationInstance) -> Self {
        Self {
            uid: instance.uid.clone(),
            nodes: instance.nodes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        let id = NodeId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "#42");
    }

    #[test]
    fn test_instance_nodes_preserve_order() {
        let instance = AnnotationInstance::new(
            "c-1",
            "comment",
            vec![NodeId::new(9).into(), NodeId::new(2).into(), NodeId::new(5).into()],
        );
        assert_eq!(
            instance.nodes(),
            vec![NodeId::new(9), NodeId::new(2), NodeId::new(5)]
        );
    }

    #[test]
    fn test_active_annotation_from_instance() {
        let instance = AnnotationInstance::new("s-7", "suggestion", vec![NodeId::new(1).into()]);
        let data = ActiveAnnotation::from(&instance);
        assert_eq!(data.uid, "s-7");
        assert_eq!(data.nodes, vec![NodeId::new(1)]);
    }

    #[test]
    fn test_active_annotation_deserialize() {
        let data: ActiveAnnotation = serde_json::from_str(r#"{"uid":"x","nodes":[]}"#).unwrap();
        assert_eq!(data.uid, "x");
        assert!(data.nodes.is_empty());
    }
}
