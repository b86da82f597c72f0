use luaform_ast::{NodeKind, SyntaxTree};
use tracing::debug;

use super::NoOptions;
use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "remove-nil-declaration",
    description: "Drops trailing `nil` values from local declarations",
    runs_before: &[],
    runs_after: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveNilDeclaration;

impl BuiltinRule for RemoveNilDeclaration {
    const META: &'static RuleMeta = &META;
    type Options = NoOptions;

    fn from_options(_: NoOptions) -> Result<Self, String> {
        Ok(Self)
    }
}

impl Rule for RemoveNilDeclaration {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut removed = 0;
        for id in tree.pre_order(tree.root()) {
            let NodeKind::LocalAssign { names } = tree.kind(id) else {
                continue;
            };
            // `local x <const> = nil` and `<close>` keep their initializer.
            if names.iter().any(|name| name.attribute.is_some()) {
                continue;
            }
            let name_count = names.len();
            let mut values = tree.children(id).to_vec();
            while let Some(&last) = values.last() {
                if !matches!(tree.kind(last), NodeKind::Nil) {
                    break;
                }
                // A call or `...` left last would spread into the names the
                // dropped values used to fill.
                let spreads = values.len() >= 2
                    && tree.kind(values[values.len() - 2]).is_multi_value()
                    && name_count >= values.len();
                if spreads {
                    break;
                }
                tree.remove(last)?;
                values.pop();
                removed += 1;
            }
        }
        debug!(removed, "removed nil initializers");
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
    #[case::single("local a = nil", "local a")]
    #[case::trailing("local a, b = 1, nil", "local a, b = 1")]
    #[case::all("local a, b = nil, nil", "local a, b")]
    #[case::extra_value("local a = 1, nil", "local a = 1")]
    #[case::middle_kept("local a, b = nil, 1", "local a, b = nil, 1")]
    #[case::call_would_spread("local a, b = f(), nil", "local a, b = f(), nil")]
    #[case::call_fills_only_its_name("local a = f(), nil", "local a = f()")]
    #[case::attribute_kept("local a <close> = nil", "local a <close> = nil")]
    fn test_remove_nil_declaration(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(apply(&RemoveNilDeclaration, source).unwrap(), expected);
    }
}
