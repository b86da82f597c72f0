//! Arena-backed syntax tree with validated mutation primitives.

use crate::error::StructuralError;
use crate::layout::check_layout;
use crate::node::{Node, NodeId, NodeKind};
use crate::span::Span;
use crate::trivia::{SerializationHints, Trivia};

type Result<T> = std::result::Result<T, StructuralError>;

/// Traversal order for [`SyntaxTree::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Parents before children.
    #[default]
    PreOrder,
    /// Children before parents.
    PostOrder,
}

/// A Lua program as an arena of nodes.
///
/// Ownership flows from the root down through child lists; the parent link is
/// a plain index kept in sync by the mutation primitives. Nodes that are
/// removed stay in the arena, detached, and are never visited again unless a
/// primitive re-attaches them.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    hints: SerializationHints,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// Creates a tree holding an empty program.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Block, Vec::new(), None)],
            root: NodeId(0),
            hints: SerializationHints::default(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.index()].children.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[inline]
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn trivia(&self, id: NodeId) -> &Trivia {
        &self.node(id).trivia
    }

    /// Trivia is serialization metadata; editing it never affects structure.
    #[inline]
    pub fn trivia_mut(&mut self, id: NodeId) -> &mut Trivia {
        &mut self.nodes[id.index()].trivia
    }

    #[inline]
    pub fn hints(&self) -> &SerializationHints {
        &self.hints
    }

    #[inline]
    pub fn hints_mut(&mut self) -> &mut SerializationHints {
        &mut self.hints
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.node(id).span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = Some(span);
    }

    /// Span of the node or of its nearest ancestor that has one.
    pub fn span_of(&self, id: NodeId) -> Option<Span> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|node| self.span(node))
    }

    /// Iterates over the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// Returns true if `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|node| node == self.root)
    }

    /// Index of `id` in its parent's child list.
    pub fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Nodes of the subtree rooted at `id` in pre-order.
    pub fn pre_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        order
    }

    /// Nodes of the subtree rooted at `id` in post-order.
    pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
            } else {
                stack.push((node, true));
                stack.extend(self.children(node).iter().rev().map(|&child| (child, false)));
            }
        }
        order
    }

    pub fn traverse(&self, id: NodeId, order: Traversal) -> Vec<NodeId> {
        match order {
            Traversal::PreOrder => self.pre_order(id),
            Traversal::PostOrder => self.post_order(id),
        }
    }

    /// Allocates a detached node after checking its layout.
    pub fn alloc(&mut self, kind: NodeKind, children: Vec<NodeId>) -> Result<NodeId> {
        self.alloc_node(kind, children, None)
    }

    /// Allocates a detached node that carries a source span.
    pub fn alloc_spanned(
        &mut self,
        kind: NodeKind,
        children: Vec<NodeId>,
        span: Span,
    ) -> Result<NodeId> {
        self.alloc_node(kind, children, Some(span))
    }

    fn alloc_node(
        &mut self,
        kind: NodeKind,
        children: Vec<NodeId>,
        span: Option<Span>,
    ) -> Result<NodeId> {
        let id = NodeId(self.nodes.len() as u32);
        self.check_fresh(&children)?;
        check_layout(&kind, &children, |child| self.kind(child))?;

        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node::new(kind, children, span));
        Ok(id)
    }

    /// Makes a detached block the program root. The previous root is detached.
    pub fn set_root(&mut self, block: NodeId) -> Result<()> {
        self.check_exists(block)?;
        if !matches!(self.kind(block), NodeKind::Block) {
            return Err(StructuralError::layout(
                "program",
                format!("root must be a block, found {}", self.kind(block).name()),
            ));
        }
        if self.parent(block).is_some() {
            return Err(StructuralError::AlreadyAttached(block));
        }
        self.root = block;
        Ok(())
    }

    /// Replaces `target` with a detached `replacement`. Returns `target`, now
    /// detached.
    pub fn replace(&mut self, target: NodeId, replacement: NodeId) -> Result<NodeId> {
        self.replace_with_many(target, vec![replacement])
    }

    /// Replaces `target` with zero or more detached nodes.
    pub fn replace_with_many(
        &mut self,
        target: NodeId,
        replacements: Vec<NodeId>,
    ) -> Result<NodeId> {
        let (parent, index) = self.slot_of(target, "replaced")?;
        self.check_attachable(&replacements, parent)?;

        let mut children = self.children(parent).to_vec();
        children.splice(index..=index, replacements.iter().copied());
        check_layout(self.kind(parent), &children, |id| self.kind(id))?;

        for &node in &replacements {
            self.nodes[node.index()].parent = Some(parent);
        }
        self.nodes[target.index()].parent = None;
        self.nodes[parent.index()].children = children;
        Ok(target)
    }

    /// Detaches `target` from its parent.
    pub fn remove(&mut self, target: NodeId) -> Result<NodeId> {
        self.replace_with_many(target, Vec::new())
    }

    /// Inserts a detached `node` right before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        self.insert_sibling(anchor, node, 0)
    }

    /// Inserts a detached `node` right after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        self.insert_sibling(anchor, node, 1)
    }

    fn insert_sibling(&mut self, anchor: NodeId, node: NodeId, offset: usize) -> Result<()> {
        let (parent, index) = self.slot_of(anchor, "given siblings")?;
        self.check_attachable(&[node], parent)?;

        let mut children = self.children(parent).to_vec();
        children.insert(index + offset, node);
        check_layout(self.kind(parent), &children, |id| self.kind(id))?;

        self.nodes[node.index()].parent = Some(parent);
        self.nodes[parent.index()].children = children;
        Ok(())
    }

    /// Wraps `target` in a new node of `kind` that takes its place.
    pub fn wrap(&mut self, target: NodeId, kind: NodeKind) -> Result<NodeId> {
        let (parent, index) = self.slot_of(target, "wrapped")?;
        let wrapper = NodeId(self.nodes.len() as u32);

        check_layout(&kind, &[target], |id| self.kind(id))?;
        let mut children = self.children(parent).to_vec();
        children[index] = wrapper;
        check_layout(self.kind(parent), &children, |id| {
            if id == wrapper { &kind } else { self.kind(id) }
        })?;

        let span = self.span(target);
        let mut node = Node::new(kind, vec![target], span);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[target.index()].parent = Some(wrapper);
        self.nodes[parent.index()].children = children;
        Ok(wrapper)
    }

    /// Replaces `target` with `descendant`, one of the nodes below it.
    /// Returns `target`, now detached and no longer holding `descendant`.
    pub fn hoist(&mut self, target: NodeId, descendant: NodeId) -> Result<NodeId> {
        let (parent, index) = self.slot_of(target, "replaced")?;
        self.check_exists(descendant)?;
        if !self.ancestors(descendant).any(|node| node == target) {
            return Err(StructuralError::layout(
                self.kind(target).name(),
                format!("node {descendant} is not below {target}"),
            ));
        }

        let mut children = self.children(parent).to_vec();
        children[index] = descendant;
        check_layout(self.kind(parent), &children, |id| self.kind(id))?;

        if let Some(old_parent) = self.parent(descendant) {
            self.nodes[old_parent.index()]
                .children
                .retain(|&child| child != descendant);
        }
        self.nodes[descendant.index()].parent = Some(parent);
        self.nodes[target.index()].parent = None;
        self.nodes[parent.index()].children = children;
        Ok(target)
    }

    /// Replaces the statement `target` with the statements of `block`.
    ///
    /// `block` must be detached or lie inside `target`; it is left empty.
    pub fn splice(&mut self, target: NodeId, block: NodeId) -> Result<NodeId> {
        let (parent, index) = self.slot_of(target, "replaced")?;
        self.check_exists(block)?;
        if !matches!(self.kind(block), NodeKind::Block) {
            return Err(StructuralError::layout(
                "splice",
                format!("expected a block, found {}", self.kind(block).name()),
            ));
        }
        if block == self.root {
            return Err(StructuralError::RootMutation("spliced"));
        }
        let inside_target = self.ancestors(block).any(|node| node == target);
        if self.parent(block).is_some() && !inside_target {
            return Err(StructuralError::AlreadyAttached(block));
        }

        let statements = self.children(block).to_vec();
        let mut children = self.children(parent).to_vec();
        children.splice(index..=index, statements.iter().copied());
        check_layout(self.kind(parent), &children, |id| self.kind(id))?;

        for &statement in &statements {
            self.nodes[statement.index()].parent = Some(parent);
        }
        self.nodes[block.index()].children.clear();
        self.nodes[target.index()].parent = None;
        self.nodes[parent.index()].children = children;
        Ok(target)
    }

    /// Detaches every child of `id` and returns them in order.
    ///
    /// Only allowed when an empty child list is valid for the node's kind.
    pub fn take_children(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        self.check_exists(id)?;
        check_layout(self.kind(id), &[], |child| self.kind(child))?;

        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for &child in &children {
            self.nodes[child.index()].parent = None;
        }
        Ok(children)
    }

    /// Changes the data of a node, keeping its children.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        self.check_exists(id)?;
        if id == self.root && !matches!(kind, NodeKind::Block) {
            return Err(StructuralError::RootMutation("turned into a non-block"));
        }
        check_layout(&kind, self.children(id), |child| self.kind(child))?;
        if let Some(parent) = self.parent(id) {
            check_layout(self.kind(parent), self.children(parent), |child| {
                if child == id { &kind } else { self.kind(child) }
            })?;
        }

        self.nodes[id.index()].kind = kind;
        Ok(())
    }

    /// Gives `id` a new kind and child list in one step.
    ///
    /// Each new child must be a current child of `id` or a detached node.
    /// Current children that are left out become detached.
    pub fn reshape(&mut self, id: NodeId, kind: NodeKind, children: Vec<NodeId>) -> Result<()> {
        self.check_exists(id)?;
        if id == self.root && !matches!(kind, NodeKind::Block) {
            return Err(StructuralError::RootMutation("turned into a non-block"));
        }
        let current = self.children(id).to_vec();
        let added: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|child| !current.contains(child))
            .collect();
        self.check_attachable(&added, id)?;
        for (i, child) in children.iter().enumerate() {
            if children[..i].contains(child) {
                return Err(StructuralError::AlreadyAttached(*child));
            }
        }
        check_layout(&kind, &children, |child| self.kind(child))?;
        if let Some(parent) = self.parent(id) {
            check_layout(self.kind(parent), self.children(parent), |child| {
                if child == id { &kind } else { self.kind(child) }
            })?;
        }

        for &child in &current {
            if !children.contains(&child) {
                self.nodes[child.index()].parent = None;
            }
        }
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.children = children;
        Ok(())
    }

    /// Checks the whole reachable tree: layouts, names and parent links.
    pub fn validate(&self) -> Result<()> {
        let root = self.node(self.root);
        if !matches!(root.kind, NodeKind::Block) {
            return Err(StructuralError::RootMutation("turned into a non-block"));
        }
        if root.parent.is_some() {
            return Err(StructuralError::ParentMismatch(self.root));
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                return Err(StructuralError::SharedNode(id));
            }
            let node = self.node(id);
            check_layout(&node.kind, &node.children, |child| self.kind(child))?;
            for &child in &node.children {
                self.check_exists(child)?;
                if self.parent(child) != Some(id) {
                    return Err(StructuralError::ParentMismatch(child));
                }
                stack.push(child);
            }
        }
        Ok(())
    }

    fn check_exists(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(StructuralError::UnknownNode(id))
        }
    }

    /// Parent and index of `target`, which must not be the root.
    fn slot_of(&self, target: NodeId, action: &'static str) -> Result<(NodeId, usize)> {
        self.check_exists(target)?;
        if target == self.root {
            return Err(StructuralError::RootMutation(action));
        }
        let parent = self
            .parent(target)
            .ok_or(StructuralError::Detached(target))?;
        let index = self
            .position_in_parent(target)
            .ok_or(StructuralError::ParentMismatch(target))?;
        Ok((parent, index))
    }

    /// Children of a node being allocated must be detached and distinct.
    fn check_fresh(&self, children: &[NodeId]) -> Result<()> {
        for (i, &child) in children.iter().enumerate() {
            self.check_exists(child)?;
            if child == self.root {
                return Err(StructuralError::RootMutation("attached"));
            }
            if self.parent(child).is_some() || children[..i].contains(&child) {
                return Err(StructuralError::AlreadyAttached(child));
            }
        }
        Ok(())
    }

    /// Nodes about to be attached under `parent` must be detached, distinct,
    /// and must not contain `parent`.
    fn check_attachable(&self, nodes: &[NodeId], parent: NodeId) -> Result<()> {
        for (i, &node) in nodes.iter().enumerate() {
            self.check_exists(node)?;
            if node == self.root {
                return Err(StructuralError::RootMutation("attached"));
            }
            if node == parent || self.ancestors(parent).any(|ancestor| ancestor == node) {
                return Err(StructuralError::Cycle {
                    node,
                    target: parent,
                });
            }
            if self.parent(node).is_some() || nodes[..i].contains(&node) {
                return Err(StructuralError::AlreadyAttached(node));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BinaryOp, CallArgs, LocalName, NumberLiteral};
    use pretty_assertions::assert_eq;

    fn number(tree: &mut SyntaxTree, value: i64) -> NodeId {
        tree.alloc(NodeKind::Number(NumberLiteral::integer(value)), vec![])
            .unwrap()
    }

    fn ident(tree: &mut SyntaxTree, name: &str) -> NodeId {
        tree.alloc(NodeKind::Identifier(name.into()), vec![]).unwrap()
    }

    /// `local x = 1 + 2` followed by `print(x)`.
    fn sample() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        let mut tree = SyntaxTree::new();
        let one = number(&mut tree, 1);
        let two = number(&mut tree, 2);
        let sum = tree
            .alloc(NodeKind::Binary { op: BinaryOp::Add }, vec![one, two])
            .unwrap();
        let local = tree
            .alloc(
                NodeKind::LocalAssign {
                    names: vec![LocalName::new("x")],
                },
                vec![sum],
            )
            .unwrap();
        let callee = ident(&mut tree, "print");
        let arg = ident(&mut tree, "x");
        let call = tree
            .alloc(
                NodeKind::Call {
                    args: CallArgs::Parenthesized,
                },
                vec![callee, arg],
            )
            .unwrap();
        let statement = tree.alloc(NodeKind::CallStatement, vec![call]).unwrap();
        let block = tree.alloc(NodeKind::Block, vec![local, statement]).unwrap();
        tree.set_root(block).unwrap();
        (tree, local, sum, statement)
    }

    #[test]
    fn test_alloc_links_parents() {
        let (tree, local, sum, _) = sample();
        assert_eq!(tree.parent(sum), Some(local));
        assert_eq!(tree.parent(local), Some(tree.root()));
        assert!(tree.is_attached(sum));
        tree.validate().unwrap();
    }

    #[test]
    fn test_alloc_rejects_bad_layout() {
        let mut tree = SyntaxTree::new();
        let one = number(&mut tree, 1);
        let err = tree.alloc(NodeKind::Block, vec![one]).unwrap_err();
        assert!(matches!(err, StructuralError::Layout { kind: "block", .. }));
        // The rejected child is still free to use.
        assert_eq!(tree.parent(one), None);
    }

    #[test]
    fn test_alloc_rejects_attached_child() {
        let (mut tree, _, sum, _) = sample();
        let err = tree.alloc(NodeKind::Paren, vec![sum]).unwrap_err();
        assert_eq!(err, StructuralError::AlreadyAttached(sum));
    }

    #[test]
    fn test_alloc_rejects_keyword_identifier() {
        let mut tree = SyntaxTree::new();
        let err = tree
            .alloc(NodeKind::Identifier("end".into()), vec![])
            .unwrap_err();
        assert_eq!(err, StructuralError::InvalidName("end".into()));
    }

    #[test]
    fn test_replace_expression() {
        let (mut tree, local, sum, _) = sample();
        let three = number(&mut tree, 3);
        let old = tree.replace(sum, three).unwrap();
        assert_eq!(old, sum);
        assert_eq!(tree.children(local), &[three]);
        assert_eq!(tree.parent(sum), None);
        assert!(!tree.is_attached(sum));
        tree.validate().unwrap();
    }

    #[test]
    fn test_replace_is_all_or_nothing() {
        let (mut tree, _, sum, statement) = sample();
        let before = tree.clone();
        // A statement cannot stand where an expression is expected.
        let stray = tree.alloc(NodeKind::Break, vec![]).unwrap();
        let err = tree.replace(sum, stray).unwrap_err();
        assert!(matches!(err, StructuralError::Layout { .. }));
        assert_eq!(tree.parent(stray), None);
        assert_eq!(tree.children(tree.root()), before.children(before.root()));
        assert_eq!(tree.parent(sum), before.parent(sum));

        // Reusing an attached node is rejected too.
        assert_eq!(
            tree.replace(sum, statement).unwrap_err(),
            StructuralError::AlreadyAttached(statement)
        );
        tree.validate().unwrap();
    }

    #[test]
    fn test_root_cannot_be_replaced_or_removed() {
        let (mut tree, ..) = sample();
        let root = tree.root();
        assert_eq!(
            tree.remove(root).unwrap_err(),
            StructuralError::RootMutation("replaced")
        );
        let block = tree.alloc(NodeKind::Block, vec![]).unwrap();
        assert!(tree.replace(root, block).is_err());
        assert!(tree.set_kind(root, NodeKind::Nil).is_err());
        assert!(tree.alloc(NodeKind::Do, vec![root]).is_err());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut tree = SyntaxTree::new();
        let inner = number(&mut tree, 1);
        let paren = tree.alloc(NodeKind::Paren, vec![inner]).unwrap();
        // `paren` is detached; putting it below its own child would loop.
        let two = number(&mut tree, 2);
        let binary = tree
            .alloc(NodeKind::Binary { op: BinaryOp::Add }, vec![two, paren])
            .unwrap();
        let err = tree.replace(two, binary).unwrap_err();
        assert_eq!(
            err,
            StructuralError::Cycle {
                node: binary,
                target: binary
            }
        );
    }

    #[test]
    fn test_remove_and_insert_statements() {
        let (mut tree, local, _, statement) = sample();
        tree.remove(local).unwrap();
        assert_eq!(tree.children(tree.root()), &[statement]);

        let brk = tree.alloc(NodeKind::Break, vec![]).unwrap();
        tree.insert_before(statement, brk).unwrap();
        let ret = tree.alloc(NodeKind::Return, vec![]).unwrap();
        tree.insert_after(statement, ret).unwrap();
        assert_eq!(tree.children(tree.root()), &[brk, statement, ret]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_return_must_stay_last() {
        let (mut tree, local, _, statement) = sample();
        let ret = tree.alloc(NodeKind::Return, vec![]).unwrap();
        let err = tree.insert_after(local, ret).unwrap_err();
        assert!(matches!(err, StructuralError::Layout { kind: "block", .. }));
        assert_eq!(tree.children(tree.root()), &[local, statement]);
    }

    #[test]
    fn test_removing_required_child_fails() {
        let (mut tree, _, sum, _) = sample();
        let left = tree.children(sum)[0];
        assert!(tree.remove(left).is_err());
        assert_eq!(tree.children(sum).len(), 2);
    }

    #[test]
    fn test_wrap_in_paren() {
        let (mut tree, local, sum, _) = sample();
        let paren = tree.wrap(sum, NodeKind::Paren).unwrap();
        assert_eq!(tree.children(local), &[paren]);
        assert_eq!(tree.children(paren), &[sum]);
        assert_eq!(tree.parent(sum), Some(paren));
        tree.validate().unwrap();
    }

    #[test]
    fn test_wrap_rejects_invalid_wrapper() {
        let (mut tree, _, _, statement) = sample();
        let before = tree.clone();
        assert!(tree.wrap(statement, NodeKind::Paren).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_hoist_descendant() {
        let (mut tree, local, sum, _) = sample();
        let right = tree.children(sum)[1];
        tree.hoist(sum, right).unwrap();
        assert_eq!(tree.children(local), &[right]);
        assert_eq!(tree.parent(right), Some(local));
        tree.validate().unwrap();
    }

    #[test]
    fn test_splice_block_into_parent() {
        let (mut tree, local, _, statement) = sample();
        let brk = tree.alloc(NodeKind::Break, vec![]).unwrap();
        let inner = tree.alloc(NodeKind::Block, vec![brk]).unwrap();
        let do_stmt = tree.alloc(NodeKind::Do, vec![inner]).unwrap();
        tree.insert_after(local, do_stmt).unwrap();

        tree.splice(do_stmt, inner).unwrap();
        assert_eq!(tree.children(tree.root()), &[local, brk, statement]);
        assert!(tree.children(inner).is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn test_reshape_index_into_field() {
        let mut tree = SyntaxTree::new();
        let t = ident(&mut tree, "t");
        let key = tree
            .alloc(NodeKind::String(crate::node::StringLiteral::new("x")), vec![])
            .unwrap();
        let index = tree.alloc(NodeKind::Index, vec![t, key]).unwrap();
        let statement = tree
            .alloc(
                NodeKind::LocalAssign {
                    names: vec![LocalName::new("v")],
                },
                vec![index],
            )
            .unwrap();
        let block = tree.alloc(NodeKind::Block, vec![statement]).unwrap();
        tree.set_root(block).unwrap();

        // A field with two children is rejected and nothing changes.
        let field = NodeKind::Field { name: "x".into() };
        assert!(tree.reshape(index, field.clone(), vec![t, key]).is_err());
        assert_eq!(tree.kind(index), &NodeKind::Index);

        tree.reshape(index, field.clone(), vec![t]).unwrap();
        assert_eq!(tree.kind(index), &field);
        assert_eq!(tree.children(index), &[t]);
        assert_eq!(tree.parent(key), None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_reshape_rejects_foreign_attached_child() {
        let (mut tree, local, sum, statement) = sample();
        let call = tree.children(statement)[0];
        assert!(tree.reshape(local, tree.kind(local).clone(), vec![call]).is_err());
        assert_eq!(tree.children(local), &[sum]);
    }

    #[test]
    fn test_take_children() {
        let (mut tree, local, sum, statement) = sample();
        let root = tree.root();

        assert!(tree.take_children(sum).is_err());
        assert_eq!(tree.children(sum).len(), 2);

        let taken = tree.take_children(root).unwrap();
        assert_eq!(taken, vec![local, statement]);
        assert!(tree.is_empty());
        assert_eq!(tree.parent(local), None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_set_kind_checks_parent_slot() {
        let (mut tree, _, _, statement) = sample();
        let call = tree.children(statement)[0];
        let callee = tree.children(call)[0];
        // The callee of a call must stay a prefix expression.
        assert!(tree.set_kind(callee, NodeKind::Nil).is_err());
        tree.set_kind(callee, NodeKind::Identifier("warn".into()))
            .unwrap();
        assert_eq!(tree.kind(callee), &NodeKind::Identifier("warn".into()));
    }

    #[test]
    fn test_traversal_orders() {
        let (tree, local, sum, statement) = sample();
        let pre = tree.pre_order(tree.root());
        assert_eq!(pre[0], tree.root());
        assert_eq!(pre[1], local);
        assert_eq!(pre[2], sum);

        let post = tree.traverse(tree.root(), Traversal::PostOrder);
        assert_eq!(*post.last().unwrap(), tree.root());
        let sum_at = post.iter().position(|&n| n == sum).unwrap();
        let local_at = post.iter().position(|&n| n == local).unwrap();
        let stmt_at = post.iter().position(|&n| n == statement).unwrap();
        assert!(sum_at < local_at && local_at < stmt_at);
        assert_eq!(pre.len(), post.len());
    }

    #[test]
    fn test_span_of_falls_back_to_ancestor() {
        let (mut tree, local, sum, _) = sample();
        tree.set_span(local, Span::new(0, 15));
        assert_eq!(tree.span_of(sum), Some(Span::new(0, 15)));
        assert_eq!(tree.span_of(tree.root()), None);
    }
}
