//! Comments and blank lines attached to nodes.
//!
//! Trivia never changes program meaning. The readable serializer reproduces
//! it; the dense serializer drops it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriviaPiece {
    /// `-- text`, stored with its leading dashes and without the newline.
    LineComment(String),
    /// `--[[ text ]]`, stored verbatim.
    BlockComment(String),
    /// One or more empty lines in the source.
    BlankLine,
}

impl TriviaPiece {
    pub fn is_comment(&self) -> bool {
        !matches!(self, TriviaPiece::BlankLine)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trivia {
    /// Written on the lines before the node.
    pub leading: Vec<TriviaPiece>,
    /// Written after the node, on the same line.
    pub trailing: Vec<TriviaPiece>,
}

impl Trivia {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }

    pub fn clear(&mut self) {
        self.leading.clear();
        self.trailing.clear();
    }
}

/// Serialization metadata a rule may set without touching program structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializationHints {
    /// Render densely regardless of the requested mode.
    pub compact: bool,
    /// Preferred maximum line width for dense output.
    pub column_span: Option<usize>,
}
