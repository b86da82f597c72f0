//! Parse error types.

use luaform_ast::StructuralError;
use thiserror::Error;

/// Errors that can occur during parsing.
///
/// Parsing is fail-fast: the first unrecoverable problem is reported and
/// nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The source text is invalid.
    #[error("{message}")]
    InvalidSource {
        /// Error message.
        message: String,
        /// Byte offset where the error occurred.
        offset: usize,
    },

    /// The source exceeds the configured size limit.
    #[error("source is {size} bytes, exceeding the limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Blocks or expressions are nested deeper than the configured limit.
    #[error("nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize, offset: usize },

    /// The parser produced a tree that violates a layout rule.
    #[error("Internal parser error: {0}")]
    Internal(#[from] StructuralError),
}

impl ParseError {
    /// Creates a new invalid source error at `offset`.
    pub fn invalid_source_at(message: impl Into<String>, offset: usize) -> Self {
        Self::InvalidSource {
            message: message.into(),
            offset,
        }
    }

    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::InvalidSource { offset, .. } | ParseError::TooDeep { offset, .. } => {
                *offset
            }
            ParseError::TooLarge { .. } | ParseError::Internal(_) => 0,
        }
    }
}
