use luaform_ast::{BinaryOp, NodeId, NodeKind, NumberValue, StructuralError, SyntaxTree, UnaryOp};
use tracing::debug;

use super::{NoOptions, needs_prefix, replace_expression};
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};
use crate::value::{evaluate, to_node};

static META: RuleMeta = RuleMeta {
    name: "constant-folding",
    description: "Evaluates operators over literal operands",
    runs_before: &["dead-branch-elimination", "convert-index-to-field"],
    runs_after: &["call-inlining"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFolding;

impl BuiltinRule for ConstantFolding {
    const META: &'static RuleMeta = &META;
    type Options = NoOptions;

    fn from_options(_: NoOptions) -> Result<Self, String> {
        Ok(Self)
    }
}

impl Rule for ConstantFolding {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut folded = 0;
        fold(tree, tree.root(), &mut folded)?;
        debug!(folded, "folded constant expressions");
        Ok(())
    }
}

fn fold(tree: &mut SyntaxTree, id: NodeId, folded: &mut usize) -> Result<(), StructuralError> {
    if is_operation(tree.kind(id)) && !is_folded(tree, id) {
        if let Some(value) = evaluate(tree, id)
            && let Some(literal) = to_node(tree, &value)?
        {
            replace_expression(tree, id, literal)?;
            *folded += 1;
            return Ok(());
        }
        if let Some(kept) = simplify_logical(tree, id)? {
            *folded += 1;
            return fold(tree, kept, folded);
        }
    }
    for child in tree.children(id).to_vec() {
        fold(tree, child, folded)?;
    }
    Ok(())
}

fn is_operation(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Binary { .. } | NodeKind::Unary { .. } | NodeKind::Paren
    )
}

/// Forms that folding would rebuild unchanged: a negated non-negative number
/// and a parenthesized literal that has to stay parenthesized.
fn is_folded(tree: &SyntaxTree, id: NodeId) -> bool {
    let Some(&operand) = tree.children(id).first() else {
        return false;
    };
    match (tree.kind(id), tree.kind(operand)) {
        (NodeKind::Unary { op: UnaryOp::Minus }, NodeKind::Number(number)) => match number.value {
            NumberValue::Integer(value) => value > 0,
            NumberValue::Float(value) => value.is_sign_positive(),
        },
        (NodeKind::Paren, kind) => kind.is_literal() && needs_prefix(tree, id),
        _ => false,
    }
}

/// `and`/`or` with a constant left operand reduce to one of their operands.
/// Returns the node to keep folding at.
fn simplify_logical(tree: &mut SyntaxTree, id: NodeId) -> Result<Option<NodeId>, StructuralError> {
    let NodeKind::Binary { op: op @ (BinaryOp::And | BinaryOp::Or) } = *tree.kind(id) else {
        return Ok(None);
    };
    let (left, right) = (tree.children(id)[0], tree.children(id)[1]);
    let Some(value) = evaluate(tree, left) else {
        return Ok(None);
    };
    let keeps_left = (op == BinaryOp::And) != value.is_truthy();
    if keeps_left {
        return match to_node(tree, &value)? {
            Some(literal) => {
                replace_expression(tree, id, literal)?;
                Ok(Some(literal))
            }
            None => Ok(None),
        };
    }

    tree.hoist(id, right)?;
    // `true and f()` yields exactly one value; a bare call could yield many.
    if tree.kind(right).is_multi_value() {
        return Ok(Some(tree.wrap(right, NodeKind::Paren)?));
    }
    Ok(Some(right))
}
