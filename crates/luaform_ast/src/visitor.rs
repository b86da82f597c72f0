//! Read-only visitor over a [`SyntaxTree`].
//!
//! `enter` is called in pre-order and `exit` in post-order, so one visitor can
//! gather both parent-first and child-first facts in a single walk.
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use luaform_ast::{NodeId, NodeKind, SyntaxTree, VisitResult, Visitor, walk};
//!
//! struct CountIdentifiers(usize);
//!
//! impl Visitor for CountIdentifiers {
//!     fn enter(&mut self, tree: &SyntaxTree, id: NodeId) -> VisitResult {
//!         if matches!(tree.kind(id), NodeKind::Identifier(_)) {
//!             self.0 += 1;
//!         }
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let tree = SyntaxTree::new();
//! let mut counter = CountIdentifiers(0);
//! let _ = walk(&tree, tree.root(), &mut counter);
//! assert_eq!(counter.0, 0);
//! ```

use std::ops::ControlFlow;

use crate::{NodeId, SyntaxTree};

/// Result type for visitor methods to control traversal.
///
/// - `ControlFlow::Continue(())` - keep walking
/// - `ControlFlow::Break(())` - stop the whole walk
pub type VisitResult = ControlFlow<()>;

pub trait Visitor {
    /// Called before the children of `id` are walked.
    #[inline]
    fn enter(&mut self, _tree: &SyntaxTree, _id: NodeId) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Called after the children of `id` are walked.
    #[inline]
    fn exit(&mut self, _tree: &SyntaxTree, _id: NodeId) -> VisitResult {
        ControlFlow::Continue(())
    }
}

/// Walks the subtree rooted at `id`.
pub fn walk<V: Visitor>(tree: &SyntaxTree, id: NodeId, visitor: &mut V) -> VisitResult {
    visitor.enter(tree, id)?;
    for &child in tree.children(id) {
        walk(tree, child, visitor)?;
    }
    visitor.exit(tree, id)
}
