//! # luaform_generator
//!
//! Turns a [`SyntaxTree`] back into Lua source.
//!
//! Two modes share one emitter:
//! - [`GeneratorMode::Readable`]: indented, one statement per line, comments
//!   kept.
//! - [`GeneratorMode::Dense`]: no comments, a space only where two tokens
//!   would otherwise merge, lines wrapped at a column span.
//!
//! Parentheses are inserted wherever operator precedence requires them, so any
//! well-formed tree renders to source that parses back to the same shape.

mod emitter;
mod literal;
mod sink;

use luaform_ast::SyntaxTree;
use tracing::debug;

use crate::emitter::Emitter;
use crate::sink::{DenseSink, ReadableSink};

/// Line width used by dense output unless configured otherwise.
pub const DEFAULT_COLUMN_SPAN: usize = 80;

/// How a tree is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorMode {
    #[default]
    Readable,
    /// Compact output. A `column_span` of zero disables line wrapping.
    Dense { column_span: usize },
}

impl GeneratorMode {
    /// Dense mode with the default column span.
    pub const fn dense() -> Self {
        GeneratorMode::Dense {
            column_span: DEFAULT_COLUMN_SPAN,
        }
    }

    /// Parses a mode name. `compact` is an alias for `dense`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "readable" => Some(GeneratorMode::Readable),
            "dense" | "compact" => Some(GeneratorMode::dense()),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            GeneratorMode::Readable => "readable",
            GeneratorMode::Dense { .. } => "dense",
        }
    }

    /// The mode after applying the tree's serialization hints.
    fn resolve(self, tree: &SyntaxTree) -> Self {
        let hints = tree.hints();
        match self {
            GeneratorMode::Readable if !hints.compact => self,
            GeneratorMode::Readable => GeneratorMode::Dense {
                column_span: hints.column_span.unwrap_or(DEFAULT_COLUMN_SPAN),
            },
            GeneratorMode::Dense { column_span } => GeneratorMode::Dense {
                column_span: hints.column_span.unwrap_or(column_span),
            },
        }
    }
}

/// Renders `tree` as Lua source.
pub fn render(tree: &SyntaxTree, mode: GeneratorMode) -> String {
    let mode = mode.resolve(tree);
    let output = match mode {
        GeneratorMode::Readable => Emitter::new(tree, ReadableSink::new()).emit(),
        GeneratorMode::Dense { column_span } => {
            Emitter::new(tree, DenseSink::new(column_span)).emit()
        }
    };
    debug!(mode = mode.name(), bytes = output.len(), "rendered tree");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use luaform_ast::{
        BinaryOp, CallArgs, LocalName, NodeKind, NumberLiteral, StringLiteral, UnaryOp,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn readable(source: &str) -> String {
        render(&luaform_parser::parse(source).unwrap(), GeneratorMode::Readable)
    }

    fn dense(source: &str) -> String {
        render(&luaform_parser::parse(source).unwrap(), GeneratorMode::dense())
    }

    #[rstest]
    #[case::readable("readable", Some(GeneratorMode::Readable))]
    #[case::dense("dense", Some(GeneratorMode::dense()))]
    #[case::compact_alias("compact", Some(GeneratorMode::dense()))]
    #[case::unknown("pretty", None)]
    fn test_mode_from_name(#[case] name: &str, #[case] expected: Option<GeneratorMode>) {
        assert_eq!(GeneratorMode::from_name(name), expected);
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(readable(""), "");
        assert_eq!(dense(""), "");
    }

    #[test]
    fn test_readable_layout() {
        let source = "local   x=1\nif x>0 then print( 'pos' ) elseif x<0 then\nprint('neg') else end\nfunction t.a:b(c,...) return c,... end";
        let expected = r#"local x = 1
if x > 0 then
    print('pos')
elseif x < 0 then
    print('neg')
else end
function t.a:b(c, ...)
    return c, ...
end"#;
        assert_eq!(readable(source), expected);
    }

    #[test]
    fn test_readable_keeps_comments_and_blank_lines() {
        let source = "-- header\nlocal x = 1 -- one\n\n\n-- about y\nlocal y = 2\ndo\n    f()\n    -- last\nend\n-- tail\n";
        let expected = "-- header\nlocal x = 1 -- one\n\n-- about y\nlocal y = 2\ndo\n    f()\n    -- last\nend\n-- tail";
        assert_eq!(readable(source), expected);
    }

    #[test]
    fn test_dense_output() {
        insta::assert_snapshot!(
            dense("local x = 1 -- c\nlocal t = { a = 1, [2] = 'b' }\nfor i = 1, #t do print(t[i]) end"),
            @"local x=1 local t={a=1,[2]='b'}for i=1,#t do print(t[i])end"
        );
    }

    #[rstest]
    #[case::minus_minus("local x = 1 - -y", "local x=1- -y")]
    #[case::concat_number("local s = a .. 1", "local s=a..1")]
    #[case::number_concat("local s = 1 .. a", "local s=1 ..a")]
    #[case::index_long_string("local v = t[ [[k]] ]", "local v=t[ [[k]]]")]
    #[case::attribute("local x <const> = 1", "local x<const> =1")]
    #[case::string_call("f 'x' g {}", "f'x'g{}")]
    fn test_dense_keeps_tokens_apart(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(dense(source), expected);
    }

    #[test]
    fn test_dense_wraps_lines() {
        let tree = luaform_parser::parse("local alpha = 1 local beta = 2 print(alpha, beta)").unwrap();
        let output = render(&tree, GeneratorMode::Dense { column_span: 20 });
        assert_eq!(output, "local alpha=1 local\nbeta=2 print(alpha,\nbeta)");
        assert!(output.lines().all(|line| line.chars().count() <= 20));
    }

    #[test]
    fn test_semicolon_before_parenthesized_statement() {
        assert_eq!(readable("a = b\n;(f)()"), "a = b;\n(f)()");
        assert_eq!(dense("a = b;(f)()"), "a=b;(f)()");
    }

    #[test]
    fn test_compact_hint_forces_dense() {
        let mut tree = luaform_parser::parse("local x = 1\nlocal y = 2").unwrap();
        tree.hints_mut().compact = true;
        assert_eq!(render(&tree, GeneratorMode::Readable), "local x=1 local y=2");

        tree.hints_mut().column_span = Some(10);
        assert_eq!(render(&tree, GeneratorMode::Readable), "local x=1\nlocal y=2");
    }

    #[rstest]
    #[case::left_assoc("(a - b) - c", "a - b - c")]
    #[case::right_grouping("a - (b - c)", "a - (b - c)")]
    #[case::pow_right_assoc("a ^ (b ^ c)", "a ^ b ^ c")]
    #[case::pow_left_grouping("(a ^ b) ^ c", "(a ^ b) ^ c")]
    #[case::concat_right_assoc("a .. (b .. c)", "a .. b .. c")]
    #[case::concat_left_grouping("(a .. b) .. c", "(a .. b) .. c")]
    #[case::lower_precedence_left("(a + b) * c", "(a + b) * c")]
    #[case::higher_precedence_right("a + (b * c)", "a + b * c")]
    #[case::unary_under_pow("(-a) ^ 2", "(-a) ^ 2")]
    #[case::pow_under_unary("-(a ^ 2)", "-a ^ 2")]
    #[case::sum_under_unary("-(a + b)", "-(a + b)")]
    #[case::not_comparison("not (a == b)", "not (a == b)")]
    fn test_precedence_parens(#[case] expression: &str, #[case] expected: &str) {
        // Parse, then drop the source parentheses so the generator has to
        // decide on its own.
        let mut tree = luaform_parser::parse(&format!("return {expression}")).unwrap();
        let parens: Vec<_> = tree
            .pre_order(tree.root())
            .into_iter()
            .filter(|&id| matches!(tree.kind(id), NodeKind::Paren))
            .collect();
        for paren in parens.into_iter().rev() {
            let inner = tree.children(paren)[0];
            tree.hoist(paren, inner).unwrap();
        }
        tree.validate().unwrap();

        let output = render(&tree, GeneratorMode::Readable);
        assert_eq!(output, format!("return {expected}"));
    }

    #[test]
    fn test_built_tree_is_parenthesized() {
        let mut tree = SyntaxTree::new();
        let a = tree.alloc(NodeKind::Identifier("a".into()), vec![]).unwrap();
        let b = tree.alloc(NodeKind::Identifier("b".into()), vec![]).unwrap();
        let sum = tree
            .alloc(NodeKind::Binary { op: BinaryOp::Add }, vec![a, b])
            .unwrap();
        let negated = tree
            .alloc(NodeKind::Unary { op: UnaryOp::Minus }, vec![sum])
            .unwrap();
        let two = tree
            .alloc(NodeKind::Number(NumberLiteral::float(2.0)), vec![])
            .unwrap();
        let product = tree
            .alloc(NodeKind::Binary { op: BinaryOp::Mul }, vec![negated, two])
            .unwrap();
        let local = tree
            .alloc(
                NodeKind::LocalAssign {
                    names: vec![LocalName::new("x")],
                },
                vec![product],
            )
            .unwrap();
        let print = tree.alloc(NodeKind::Identifier("print".into()), vec![]).unwrap();
        let text = tree
            .alloc(NodeKind::String(StringLiteral::new("it's")), vec![])
            .unwrap();
        let call = tree
            .alloc(NodeKind::Call { args: CallArgs::String }, vec![print, text])
            .unwrap();
        let statement = tree.alloc(NodeKind::CallStatement, vec![call]).unwrap();
        let block = tree.alloc(NodeKind::Block, vec![local, statement]).unwrap();
        tree.set_root(block).unwrap();

        assert_eq!(
            render(&tree, GeneratorMode::Readable),
            "local x = -(a + b) * 2.0\nprint \"it's\""
        );
    }

    #[test]
    fn test_if_expression_operand_is_parenthesized() {
        let mut tree = luaform_parser::parse("return (if a then 1 else 2) + 3").unwrap();
        let paren = tree
            .pre_order(tree.root())
            .into_iter()
            .find(|&id| matches!(tree.kind(id), NodeKind::Paren))
            .unwrap();
        let inner = tree.children(paren)[0];
        tree.hoist(paren, inner).unwrap();
        assert_eq!(
            render(&tree, GeneratorMode::Readable),
            "return (if a then 1 else 2) + 3"
        );
    }

    #[rstest]
    #[case::statements("local a, b <const> = 1, 'x'\na.b[c]:d(e)\nx += 1\ns ..= \"t\"")]
    #[case::control_flow(
        "while true do\n    if a then\n        break\n    end\nend\nrepeat\n    continue\nuntil x\nfor i = 10, 1, -1 do end"
    )]
    #[case::functions("local function f(...)\n    return ...\nend\nlocal g = function(a, b) end")]
    #[case::goto("::top::\ngoto top")]
    #[case::tables("local t = {1, 2; x = {y = [[long]]}, [f()] = 0x10}")]
    #[case::comments("-- a\nlocal x = 1 --[[ b ]] -- c\n\n-- d\ndo\n    -- e\nend")]
    #[case::if_expression("local v = if a then 1 elseif b then 2 else 3")]
    fn test_readable_round_trip(#[case] source: &str) {
        let first = readable(source);
        let second = readable(&first);
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::statements("local a, b <const> = 1, 'x' a.b[c]:d(e) x += 1")]
    #[case::nested("local function f(a) if a then return -a else return - -a end end")]
    fn test_dense_output_parses_to_same_program(#[case] source: &str) {
        let expected = readable(source);
        assert_eq!(readable(&dense(source)), expected);
    }
}
