//! Built-in rules.

mod call_inlining;
mod constant_folding;
mod convert_index_to_field;
mod dead_branch_elimination;
mod identifier_renaming;
mod minify;
mod remove_call_parens;
mod remove_empty_do;
mod remove_nil_declaration;
mod string_encoding;

pub use call_inlining::{CallInlining, CallInliningOptions};
pub use constant_folding::ConstantFolding;
pub use convert_index_to_field::ConvertIndexToField;
pub use dead_branch_elimination::DeadBranchElimination;
pub use identifier_renaming::{
    IdentifierRenaming, OnRedeclaration, RenamingOptions, RenamingStrategy,
};
pub use minify::{Minify, MinifyOptions};
pub use remove_call_parens::RemoveCallParens;
pub use remove_empty_do::RemoveEmptyDo;
pub use remove_nil_declaration::RemoveNilDeclaration;
pub use string_encoding::{StringEncoding, StringEncodingOptions};

use luaform_ast::{NodeId, NodeKind, StructuralError, SyntaxTree};
use serde::Deserialize;

/// Options of rules that take none. Any key is rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoOptions {}

/// Returns true if `id` sits where only a prefix expression is allowed: the
/// callee of a call, the receiver of a method call, or the object of an
/// index or field access.
pub(crate) fn needs_prefix(tree: &SyntaxTree, id: NodeId) -> bool {
    let Some(parent) = tree.parent(id) else {
        return false;
    };
    tree.position_in_parent(id) == Some(0)
        && matches!(
            tree.kind(parent),
            NodeKind::Call { .. } | NodeKind::MethodCall { .. } | NodeKind::Field { .. } | NodeKind::Index
        )
}

/// Replaces an expression, parenthesizing the replacement where the slot
/// requires a prefix expression.
pub(crate) fn replace_expression(
    tree: &mut SyntaxTree,
    target: NodeId,
    replacement: NodeId,
) -> Result<(), StructuralError> {
    let replacement =
        if needs_prefix(tree, target) && !tree.kind(replacement).is_prefix_expression() {
            tree.alloc(NodeKind::Paren, vec![replacement])?
        } else {
            replacement
        };
    tree.replace(target, replacement)?;
    Ok(())
}
