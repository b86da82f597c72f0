//! # luaform_ast
//!
//! Syntax tree for the luaform Lua transformation engine.
//!
//! ## Architecture
//!
//! - Nodes live in a single arena owned by [`SyntaxTree`] and refer to each
//!   other by [`NodeId`]
//! - Children are ordered id lists; the parent link is a weak back-reference
//! - Every mutation primitive validates the grammar layout of the affected
//!   nodes first and either commits completely or returns a
//!   [`StructuralError`] without touching the tree
//!
//! ## Example
//!
//! ```rust
//! use luaform_ast::{BinaryOp, LocalName, NodeKind, NumberLiteral, SyntaxTree};
//!
//! let mut tree = SyntaxTree::new();
//! let one = tree.alloc(NodeKind::Number(NumberLiteral::integer(1)), vec![]).unwrap();
//! let two = tree.alloc(NodeKind::Number(NumberLiteral::integer(2)), vec![]).unwrap();
//! let sum = tree.alloc(NodeKind::Binary { op: BinaryOp::Add }, vec![one, two]).unwrap();
//! let local = tree
//!     .alloc(NodeKind::LocalAssign { names: vec![LocalName::new("x")] }, vec![sum])
//!     .unwrap();
//! let block = tree.alloc(NodeKind::Block, vec![local]).unwrap();
//! tree.set_root(block).unwrap();
//!
//! let three = tree.alloc(NodeKind::Number(NumberLiteral::integer(3)), vec![]).unwrap();
//! tree.replace(sum, three).unwrap();
//! assert!(tree.validate().is_ok());
//! ```

mod error;
mod layout;
mod names;
mod node;
mod span;
mod tree;
mod trivia;
pub mod visitor;

pub use error::StructuralError;
pub use names::{KEYWORDS, is_keyword, is_valid_identifier};
pub use node::{
    Attribute, BinaryOp, CallArgs, Category, CompoundOp, FunctionName, LocalName, Node, NodeId,
    NodeKind, NumberLiteral, NumberValue, StringLiteral, StringStyle, UNARY_PRIORITY, UnaryOp,
};
pub use span::{LineIndex, Position, Span};
pub use tree::{SyntaxTree, Traversal};
pub use trivia::{SerializationHints, Trivia, TriviaPiece};

pub use visitor::{VisitResult, Visitor, walk};
