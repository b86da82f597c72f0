use luaform_ast::SyntaxTree;
use serde::Deserialize;
use tracing::debug;

use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "minify",
    description: "Drops comments and blank lines and asks for dense output",
    runs_before: &[],
    runs_after: &["identifier-renaming", "string-encoding"],
};

const DEFAULT_COLUMN_SPAN: u32 = 80;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MinifyOptions {
    /// Maximum line width of the dense output; zero disables wrapping.
    pub column_span: u32,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            column_span: DEFAULT_COLUMN_SPAN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Minify {
    options: MinifyOptions,
}

impl BuiltinRule for Minify {
    const META: &'static RuleMeta = &META;
    type Options = MinifyOptions;

    fn from_options(options: MinifyOptions) -> Result<Self, String> {
        Ok(Self { options })
    }
}

impl Rule for Minify {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        for id in tree.pre_order(tree.root()) {
            tree.trivia_mut(id).clear();
        }
        let hints = tree.hints_mut();
        hints.compact = true;
        hints.column_span = Some(
            usize::try_from(self.options.column_span).unwrap_or(usize::MAX),
        );
        debug!(column_span = self.options.column_span, "requested dense output");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_minify() {
        let source = "-- header\nlocal x = 1 -- one\n\nlocal y = x + 1\n-- tail";
        assert_eq!(apply(&Minify::default(), source).unwrap(), "local x=1 local y=x+1");
    }

    #[test]
    fn test_column_span() {
        let minify = Minify {
            options: MinifyOptions { column_span: 12 },
        };
        assert_eq!(
            apply(&minify, "local alpha = 1\nlocal beta = 2").unwrap(),
            "local alpha=\n1 local beta\n=2"
        );
    }

    #[test]
    fn test_column_span_range() {
        let options: MinifyOptions = serde_json::from_value(json!({ "column_span": 40 })).unwrap();
        assert_eq!(options.column_span, 40);

        let too_wide = json!({ "column_span": 4_294_967_296u64 });
        assert!(serde_json::from_value::<MinifyOptions>(too_wide).is_err());
    }
}
