use luaform_ast::{NodeKind, SyntaxTree};
use tracing::debug;

use super::NoOptions;
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "remove-empty-do",
    description: "Removes `do end` statements with empty bodies",
    runs_before: &[],
    runs_after: &["dead-branch-elimination"],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveEmptyDo;

impl BuiltinRule for RemoveEmptyDo {
    const META: &'static RuleMeta = &META;
    type Options = NoOptions;

    fn from_options(_: NoOptions) -> Result<Self, String> {
        Ok(Self)
    }
}

impl Rule for RemoveEmptyDo {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut removed = 0;
        // Post-order, so `do do end end` goes in one pass.
        for id in tree.post_order(tree.root()) {
            if matches!(tree.kind(id), NodeKind::Do)
                && tree.children(tree.children(id)[0]).is_empty()
                && tree.is_attached(id)
            {
                tree.remove(id)?;
                removed += 1;
            }
        }
        debug!(removed, "removed empty do blocks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::empty("do end\nf()", "f()")]
    #[case::nested("do do end end", "")]
    #[case::inside_function("local function f() do end return 1 end", "local function f()\n    return 1\nend")]
    #[case::non_empty_kept("do f() end", "do\n    f()\nend")]
    fn test_remove_empty_do(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(apply(&RemoveEmptyDo, source).unwrap(), expected);
    }
}
