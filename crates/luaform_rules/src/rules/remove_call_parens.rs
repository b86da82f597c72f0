use luaform_ast::{CallArgs, NodeKind, SyntaxTree};
use tracing::debug;

use super::NoOptions;
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "remove-call-parens",
    description: "Writes single string or table arguments without parentheses",
    runs_before: &[],
    runs_after: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveCallParens;

impl BuiltinRule for RemoveCallParens {
    const META: &'static RuleMeta = &META;
    type Options = NoOptions;

    fn from_options(_: NoOptions) -> Result<Self, String> {
        Ok(Self)
    }
}

impl Rule for RemoveCallParens {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut changed = 0;
        for id in tree.pre_order(tree.root()) {
            let [_, argument] = tree.children(id) else {
                continue;
            };
            let style = match tree.kind(*argument) {
                NodeKind::String(_) => CallArgs::String,
                NodeKind::Table => CallArgs::Table,
                _ => continue,
            };
            let kind = match tree.kind(id) {
                NodeKind::Call {
                    args: CallArgs::Parenthesized,
                } => NodeKind::Call { args: style },
                NodeKind::MethodCall {
                    method,
                    args: CallArgs::Parenthesized,
                } => NodeKind::MethodCall {
                    method: method.clone(),
                    args: style,
                },
                _ => continue,
            };
            tree.set_kind(id, kind)?;
            changed += 1;
        }
        debug!(changed, "removed call parentheses");
        Ok(())
    }
}
