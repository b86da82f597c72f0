use luaform_ast::{NodeId, NodeKind, StructuralError, SyntaxTree};
use tracing::debug;

use super::NoOptions;
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};
use crate::value::static_truthiness;

static META: RuleMeta = RuleMeta {
    name: "dead-branch-elimination",
    description: "Removes branches and loops whose conditions are statically known",
    runs_before: &["remove-empty-do"],
    runs_after: &["constant-folding"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DeadBranchElimination;

impl BuiltinRule for DeadBranchElimination {
    const META: &'static RuleMeta = &META;
    type Options = NoOptions;

    fn from_options(_: NoOptions) -> Result<Self, String> {
        Ok(Self)
    }
}

impl Rule for DeadBranchElimination {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut eliminated = 0;
        for id in tree.post_order(tree.root()) {
            if !tree.is_attached(id) {
                continue;
            }
            let changed = match tree.kind(id) {
                NodeKind::If => eliminate_if(tree, id)?,
                NodeKind::While => {
                    let condition = tree.children(id)[0];
                    if static_truthiness(tree, condition) == Some(false) {
                        tree.remove(id)?;
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            };
            eliminated += usize::from(changed);
        }
        debug!(eliminated, "eliminated dead branches");
        Ok(())
    }
}

fn eliminate_if(tree: &mut SyntaxTree, id: NodeId) -> Result<bool, StructuralError> {
    let children = tree.children(id).to_vec();
    let mut else_block = (children.len() % 2 == 1).then(|| children[children.len() - 1]);
    let mut kept = Vec::new();
    let mut changed = false;

    for pair in children.chunks_exact(2) {
        let (condition, block) = (pair[0], pair[1]);
        match static_truthiness(tree, condition) {
            Some(false) => changed = true,
            Some(true) => {
                changed = true;
                else_block = Some(block);
                break;
            }
            None => kept.extend([condition, block]),
        }
    }
    if !changed {
        return Ok(false);
    }

    if !kept.is_empty() {
        kept.extend(else_block);
        tree.reshape(id, NodeKind::If, kept)?;
    } else if let Some(block) = else_block {
        inline_block(tree, id, block)?;
    } else {
        tree.remove(id)?;
    }
    Ok(true)
}

/// Puts the statements of `block` in place of `statement`: spliced directly
/// when that keeps scoping and `return` placement intact, otherwise inside a
/// `do ... end`.
fn inline_block(tree: &mut SyntaxTree, statement: NodeId, block: NodeId) -> Result<(), StructuralError> {
    let declares_names = tree.children(block).iter().any(|&child| {
        matches!(
            tree.kind(child),
            NodeKind::LocalAssign { .. } | NodeKind::LocalFunction { .. } | NodeKind::Label { .. }
        )
    });
    let ends_with_return = tree
        .children(block)
        .last()
        .is_some_and(|&last| matches!(tree.kind(last), NodeKind::Return));
    let is_last = tree
        .parent(statement)
        .is_some_and(|parent| tree.children(parent).last() == Some(&statement));

    if !declares_names && (!ends_with_return || is_last) {
        let leading = std::mem::take(&mut tree.trivia_mut(statement).leading);
        let first = tree.children(block).first().copied();
        tree.splice(statement, block)?;
        if let Some(first) = first {
            let trivia = tree.trivia_mut(first);
            let own = std::mem::replace(&mut trivia.leading, leading);
            trivia.leading.extend(own);
        }
        return Ok(());
    }

    let statements = tree.take_children(block)?;
    let body = tree.alloc(NodeKind::Block, statements)?;
    let inner = tree.trivia(block).clone();
    *tree.trivia_mut(body) = inner;
    let wrapper = tree.alloc(NodeKind::Do, vec![body])?;
    let outer = tree.trivia(statement).clone();
    *tree.trivia_mut(wrapper) = outer;
    if let Some(span) = tree.span(statement) {
        tree.set_span(wrapper, span);
    }
    tree.replace(statement, wrapper)?;
    Ok(())
}
