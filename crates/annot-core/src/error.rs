use thiserror::Error;

use crate::types::NodeId;

/// Error types shared by all annot-watch crates.
///
/// The change-detection engine has no failure modes of its own. Errors come
/// from collaborators (identification, document backends) or from the
/// environment the tracker is driven from.
///
/// # Examples
///
/// ```
/// use annot_core::error::{AnnotateError, Result};
///
/// fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
///     if end > len || start > end {
///         return Err(AnnotateError::InvalidRange { start, end, len });
///     }
///     Ok(())
/// }
///
/// assert!(check_range(0, 4, 10).is_ok());
/// assert!(check_range(3, 12, 10).is_err());
/// ```
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("failed to identify annotation {name}: {source}")]
    Identification {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no tokio runtime available to schedule annotation scan")]
    RuntimeUnavailable,

    #[error("range {start}..{end} out of bounds for document of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("unknown document node: {0}")]
    UnknownNode(NodeId),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, AnnotateError>`.
pub type Result<T> = std::result::Result<T, AnnotateError>;
