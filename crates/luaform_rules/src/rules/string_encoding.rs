use luaform_ast::{NodeKind, StringStyle, SyntaxTree};
use serde::Deserialize;
use tracing::debug;

use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "string-encoding",
    description: "Writes string literals as hexadecimal escape sequences",
    runs_before: &[],
    runs_after: &["convert-index-to-field"],
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StringEncodingOptions {
    /// Only strings with one of these values are encoded.
    pub strings: Option<Vec<String>>,
    /// Shorter strings are left alone.
    pub min_length: usize,
}

impl Default for StringEncodingOptions {
    fn default() -> Self {
        Self {
            strings: None,
            min_length: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringEncoding {
    options: StringEncodingOptions,
}

impl BuiltinRule for StringEncoding {
    const META: &'static RuleMeta = &META;
    type Options = StringEncodingOptions;

    fn from_options(options: StringEncodingOptions) -> Result<Self, String> {
        Ok(Self { options })
    }
}

impl StringEncoding {
    fn selects(&self, value: &[u8]) -> bool {
        value.len() >= self.options.min_length
            && self
                .options
                .strings
                .as_ref()
                .is_none_or(|strings| strings.iter().any(|s| s.as_bytes() == value))
    }
}

impl Rule for StringEncoding {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let mut encoded = 0;
        for id in tree.pre_order(tree.root()) {
            let NodeKind::String(literal) = tree.kind(id) else {
                continue;
            };
            if literal.style == StringStyle::Escaped || !self.selects(&literal.value) {
                continue;
            }
            let mut literal = literal.clone();
            literal.style = StringStyle::Escaped;
            literal.raw = None;
            tree.set_kind(id, NodeKind::String(literal))?;
            encoded += 1;
        }
        debug!(encoded, "encoded string literals");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply;
    use pretty_assertions::assert_eq;

    fn encode(options: StringEncodingOptions, source: &str) -> String {
        apply(&StringEncoding { options }, source).unwrap()
    }

    #[test]
    fn test_encodes_all_strings() {
        assert_eq!(
            encode(StringEncodingOptions::default(), "print('hi', [[a]], \"\")"),
            r#"print("\x68\x69", "\x61", "")"#
        );
    }

    #[test]
    fn test_restricted_set() {
        let options = StringEncodingOptions {
            strings: Some(vec!["secret".to_string()]),
            ..StringEncodingOptions::default()
        };
        assert_eq!(
            encode(options, "f('secret', 'open')"),
            r#"f("\x73\x65\x63\x72\x65\x74", 'open')"#
        );
    }

    #[test]
    fn test_min_length() {
        let options = StringEncodingOptions {
            min_length: 3,
            ..StringEncodingOptions::default()
        };
        assert_eq!(encode(options, "f('ab', 'abc')"), r#"f('ab', "\x61\x62\x63")"#);
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let result: Result<StringEncodingOptions, _> =
            serde_json::from_value(serde_json::json!({ "min_len": 2 }));
        assert!(result.is_err());
    }
}
