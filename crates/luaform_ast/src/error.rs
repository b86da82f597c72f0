//! Structural error type.

use thiserror::Error;

use crate::NodeId;

/// A mutation or tree shape that would break grammar well-formedness.
///
/// Every mutation primitive returns this instead of committing a partial
/// change; the tree is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("node {0} has no parent")]
    Detached(NodeId),

    #[error("the root block cannot be {0}")]
    RootMutation(&'static str),

    #[error("attaching node {node} under {target} would create a cycle")]
    Cycle {
        node: NodeId,
        target: NodeId,
    },

    #[error("invalid {kind}: {message}")]
    Layout { kind: &'static str, message: String },

    #[error("`{0}` is not a valid identifier")]
    InvalidName(String),

    #[error("node {0} is not linked to its parent")]
    ParentMismatch(NodeId),

    #[error("node {0} is reachable more than once")]
    SharedNode(NodeId),
}

impl StructuralError {
    /// Creates a layout error for a node kind.
    pub fn layout(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Layout {
            kind,
            message: message.into(),
        }
    }
}
