use luaform_ast::{NodeKind, SyntaxTree, is_valid_identifier};
use tracing::debug;

use super::NoOptions;
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "convert-index-to-field",
    description: "Rewrites string keys that are valid names as field accesses",
    runs_before: &["string-encoding"],
    runs_after: &["constant-folding"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertIndexToField;

impl BuiltinRule for ConvertIndexToField {
    const META: &'static RuleMeta = &META;
    type Options = NoOptions;

    fn from_options(_: NoOptions) -> Result<Self, String> {
        Ok(Self)
    }
}

impl Rule for ConvertIndexToField {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut converted = 0;
        for id in tree.pre_order(tree.root()) {
            let key_position = match tree.kind(id) {
                NodeKind::Index => 1,
                NodeKind::TableIndex => 0,
                _ => continue,
            };
            let children = tree.children(id).to_vec();
            let NodeKind::String(key) = tree.kind(children[key_position]) else {
                continue;
            };
            let Some(name) = key.as_str().filter(|name| is_valid_identifier(name)) else {
                continue;
            };
            let name = name.to_string();
            match key_position {
                1 => tree.reshape(id, NodeKind::Field { name }, vec![children[0]])?,
                _ => tree.reshape(id, NodeKind::TableField { name }, vec![children[1]])?,
            }
            converted += 1;
        }
        debug!(converted, "converted string keys to fields");
        Ok(())
    }
}
