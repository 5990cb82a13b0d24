use crate::config::MarkerConfig;
use annot_core::{AnnotationDocument, Result};
use std::sync::Arc;

/// Flips the active attribute on the marker nodes of one annotation instance.
///
/// Markers are looked up by uid on every call rather than remembered, so
/// nodes the document recreated since the last scan are still found.
pub struct MarkerToggler {
    document: Arc<dyn AnnotationDocument>,
    config: MarkerConfig,
}

impl MarkerToggler {
    pub fn new(document: Arc<dyn AnnotationDocument>, config: MarkerConfig) -> Self {
        Self { document, config }
    }

    pub fn attribute(&self) -> &str {
        &self.config.active_attribute
    }

    /// Sets (`active = true`) or removes the active attribute on every marker of `uid`.
    ///
    /// Returns the number of nodes touched. Idempotent; a uid without
    /// markers touches nothing.
    pub fn toggle_active(&self, uid: &str, active: bool) -> Result<usize> {
        let nodes = self.document.find_markers(uid);
        for node in &nodes {
            if active {
                self.document.set_attribute(
                    *node,
                    &self.config.active_attribute,
                    &self.config.active_value,
                )?;
            } else {
                self.document
                    .remove_attribute(*node, &self.config.active_attribute)?;
            }
        }
        tracing::trace!(
            "Toggled {} marker(s) of {} to active={}",
            nodes.len(),
            uid,
            active
        );
        Ok(nodes.len())
    }
}
