//! # luaform_parser
//!
//! Lexer and recursive-descent parser for Lua 5.4 with the Luau extensions
//! luaform understands (compound assignment, `continue`, if-expressions and
//! binary literals).
//!
//! Parsing is fail-fast: the first error is reported with the byte offset it
//! points at, and no tree is returned.
//!
//! ## Example
//!
//! ```rust
//! use luaform_ast::NodeKind;
//!
//! let tree = luaform_parser::parse("local x = 1 + 2").unwrap();
//! let statement = tree.children(tree.root())[0];
//! assert!(matches!(tree.kind(statement), NodeKind::LocalAssign { .. }));
//! ```

mod error;
mod lexer;
mod parser;
mod token;

use luaform_ast::SyntaxTree;

pub use error::ParseError;
pub use parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_SOURCE_BYTES, ParserOptions};

/// Parses `source` with the default limits.
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    parse_with_options(source, ParserOptions::default())
}

/// Parses `source` with explicit limits.
pub fn parse_with_options(source: &str, options: ParserOptions) -> Result<SyntaxTree, ParseError> {
    if source.len() > options.max_source_bytes {
        return Err(ParseError::TooLarge {
            size: source.len(),
            limit: options.max_source_bytes,
        });
    }
    parser::Parser::new(source, options).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use luaform_ast::{
        Attribute, BinaryOp, CallArgs, CompoundOp, NodeId, NodeKind, NumberValue, TriviaPiece,
        UnaryOp,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn statements(tree: &SyntaxTree) -> Vec<NodeId> {
        tree.children(tree.root()).to_vec()
    }

    fn first(tree: &SyntaxTree) -> NodeId {
        statements(tree)[0]
    }

    /// Value of the single `local x = <expr>` declaration.
    fn local_value(source: &str) -> (SyntaxTree, NodeId) {
        let tree = parse(source).unwrap();
        let value = tree.children(first(&tree))[0];
        (tree, value)
    }

    fn error_of(source: &str) -> (String, usize) {
        let error = parse(source).unwrap_err();
        (error.to_string(), error.offset())
    }

    #[test]
    fn test_empty_source() {
        let tree = parse("").unwrap();
        assert!(tree.is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn test_statement_kinds() {
        let source = r#"
local a, b <const> = 1, 2
x = a
t.f, t[1] = 1, 2
print("hi")
do end
while a do break end
repeat local z = 1 until z
if a then elseif b then else end
for i = 1, 10, 2 do end
for k, v in pairs(t) do continue end
function m.f:g() end
local function h(...) return ... end
::top:: goto top
x += 1
"#;
        let tree = parse(source).unwrap();
        tree.validate().unwrap();
        let names: Vec<_> = statements(&tree)
            .into_iter()
            .map(|id| tree.kind(id).name())
            .collect();
        assert_eq!(
            names,
            vec![
                "local assignment",
                "assignment",
                "assignment",
                "call statement",
                "do statement",
                "while loop",
                "repeat loop",
                "if statement",
                "numeric for loop",
                "generic for loop",
                "function declaration",
                "local function",
                "label",
                "goto statement",
                "compound assignment",
            ]
        );
    }

    #[test]
    fn test_local_attributes() {
        let tree = parse("local a <const>, b <close> = 1, 2").unwrap();
        let NodeKind::LocalAssign { names } = tree.kind(first(&tree)) else {
            panic!("expected a local declaration");
        };
        assert_eq!(names[0].attribute, Some(Attribute::Const));
        assert_eq!(names[1].attribute, Some(Attribute::Close));
    }

    #[rstest]
    #[case::left_assoc_sub("local x = 1 - 2 - 3", BinaryOp::Sub, "1 - 2")]
    #[case::concat_right_assoc("local x = a .. b .. c", BinaryOp::Concat, "a")]
    #[case::pow_right_assoc("local x = a ^ b ^ c", BinaryOp::Pow, "a")]
    #[case::mul_binds_tighter("local x = a + b * c", BinaryOp::Add, "a")]
    #[case::or_loosest("local x = a and b or c", BinaryOp::Or, "a and b")]
    #[case::comparison_vs_bitor("local x = a | b == c", BinaryOp::Equal, "a | b")]
    fn test_precedence(#[case] source: &str, #[case] op: BinaryOp, #[case] left: &str) {
        let (tree, value) = local_value(source);
        assert_eq!(tree.kind(value), &NodeKind::Binary { op });
        let left_span = tree.span(tree.children(value)[0]).unwrap();
        assert_eq!(
            &source[left_span.start as usize..left_span.end as usize],
            left
        );
    }

    #[test]
    fn test_unary_binds_looser_than_pow() {
        let (tree, value) = local_value("local x = -a ^ 2");
        assert_eq!(tree.kind(value), &NodeKind::Unary { op: UnaryOp::Minus });
        let operand = tree.children(value)[0];
        assert_eq!(tree.kind(operand), &NodeKind::Binary { op: BinaryOp::Pow });
    }

    #[test]
    fn test_unary_binds_tighter_than_comparison() {
        let (tree, value) = local_value("local x = not a == b");
        assert_eq!(tree.kind(value), &NodeKind::Binary { op: BinaryOp::Equal });
    }

    #[test]
    fn test_parentheses_are_kept() {
        let (tree, value) = local_value("local x = (f())");
        assert_eq!(tree.kind(value), &NodeKind::Paren);
    }

    #[test]
    fn test_call_argument_styles() {
        let tree = parse("f'a' g{1} o:m(1, 2) o:n{}").unwrap();
        let styles: Vec<_> = statements(&tree)
            .into_iter()
            .map(|statement| match tree.kind(tree.children(statement)[0]) {
                NodeKind::Call { args } | NodeKind::MethodCall { args, .. } => *args,
                other => panic!("unexpected {}", other.name()),
            })
            .collect();
        assert_eq!(
            styles,
            vec![
                CallArgs::String,
                CallArgs::Table,
                CallArgs::Parenthesized,
                CallArgs::Table
            ]
        );
    }

    #[test]
    fn test_table_entries() {
        let (tree, value) = local_value("local t = { 1, x = 2; [k] = 3, y }");
        let kinds: Vec<_> = tree
            .children(value)
            .iter()
            .map(|&entry| std::mem::discriminant(tree.kind(entry)))
            .collect();
        let field = NodeKind::TableField {
            name: "x".to_string(),
        };
        assert_eq!(
            kinds,
            vec![
                std::mem::discriminant(&NodeKind::TableValue),
                std::mem::discriminant(&field),
                std::mem::discriminant(&NodeKind::TableIndex),
                std::mem::discriminant(&NodeKind::TableValue),
            ]
        );
    }

    #[test]
    fn test_if_expression() {
        let (tree, value) = local_value("local x = if a then 1 elseif b then 2 else 3");
        assert_eq!(tree.kind(value), &NodeKind::IfExpression);
        assert_eq!(tree.children(value).len(), 5);
    }

    #[test]
    fn test_compound_assignment() {
        let tree = parse("s ..= 'x'").unwrap();
        assert_eq!(
            tree.kind(first(&tree)),
            &NodeKind::CompoundAssign {
                op: CompoundOp::Concat
            }
        );
    }

    #[rstest]
    #[case::call("continue()")]
    #[case::assignment("continue = 1")]
    #[case::field("continue.x = 1")]
    fn test_continue_as_identifier(#[case] source: &str) {
        parse(source).unwrap();
    }

    #[test]
    fn test_number_literal_keeps_raw_text() {
        let (tree, value) = local_value("local x = 0x10");
        let NodeKind::Number(number) = tree.kind(value) else {
            panic!("expected a number");
        };
        assert_eq!(number.value, NumberValue::Integer(16));
        assert_eq!(number.raw.as_deref(), Some("0x10"));
    }

    #[test]
    fn test_return_must_end_block() {
        let (message, _) = error_of("return 1 print(2)");
        assert_eq!(message, "'<eof>' expected near 'print'");
    }

    #[test]
    fn test_return_with_semicolon() {
        let tree = parse("do return; end").unwrap();
        tree.validate().unwrap();
    }

    #[rstest]
    #[case::missing_end("if x then", "'end' expected (to close 'if') near <eof>", 9)]
    #[case::missing_then("if x y()", "'then' expected near 'y'", 5)]
    #[case::bad_for("for x do end", "'=' or 'in' expected near 'do'", 6)]
    #[case::bad_statement("x", "syntax error near <eof>", 1)]
    #[case::bad_expression("local x = )", "unexpected symbol near ')'", 10)]
    #[case::not_assignable("f() = 1", "cannot assign to call", 0)]
    #[case::break_outside_loop("break", "break outside a loop", 0)]
    #[case::continue_outside_loop("continue", "continue outside a loop", 0)]
    #[case::break_in_function_in_loop(
        "while true do local f = function() break end end",
        "break outside a loop",
        35
    )]
    #[case::vararg_outside_vararg_function(
        "function f() return ... end",
        "cannot use '...' outside a vararg function near '...'",
        20
    )]
    #[case::unknown_attribute("local x <mut> = 1", "unknown attribute 'mut'", 8)]
    #[case::two_close_variables(
        "local a <close>, b <close> = 1, 2",
        "multiple to-be-closed variables in local list",
        19
    )]
    #[case::if_expression_without_else(
        "local x = if a then 1",
        "'else' expected near <eof>",
        21
    )]
    fn test_errors(#[case] source: &str, #[case] message: &str, #[case] offset: usize) {
        assert_eq!(error_of(source), (message.to_string(), offset));
    }

    #[test]
    fn test_main_chunk_is_variadic() {
        parse("local a, b = ...").unwrap();
    }

    #[test]
    fn test_depth_limit() {
        let source = format!("local x = {}1{}", "(".repeat(300), ")".repeat(300));
        let error = parse(&source).unwrap_err();
        assert!(matches!(error, ParseError::TooDeep { limit: 200, .. }));

        let options = ParserOptions {
            max_depth: 1000,
            ..ParserOptions::default()
        };
        parse_with_options(&source, options).unwrap();
    }

    #[rstest]
    #[case::binary_chain(format!("x = 1{}", " + a".repeat(100_000)))]
    #[case::concat_chain(format!("x = a{}", " .. a".repeat(100_000)))]
    #[case::field_chain(format!("x = a{}", ".b".repeat(100_000)))]
    #[case::index_chain(format!("x = a{}", "[1]".repeat(100_000)))]
    #[case::call_chain(format!("f{}", "()".repeat(100_000)))]
    #[case::method_chain(format!("o{}", ":m()".repeat(100_000)))]
    fn test_long_chains_hit_depth_limit(#[case] source: String) {
        let error = parse(&source).unwrap_err();
        assert!(matches!(error, ParseError::TooDeep { limit: 200, .. }));
    }

    #[test]
    fn test_chains_within_limit() {
        let tree = parse(&format!("x = 1{}", " + a".repeat(150))).unwrap();
        tree.validate().unwrap();
        parse(&format!("x = a{}", ".b".repeat(150))).unwrap();
    }

    #[test]
    fn test_size_limit() {
        let options = ParserOptions {
            max_source_bytes: 4,
            ..ParserOptions::default()
        };
        let error = parse_with_options("x = 1", options).unwrap_err();
        assert_eq!(error, ParseError::TooLarge { size: 5, limit: 4 });
    }

    #[test]
    fn test_comments_attach_to_statements() {
        let source = "-- header\nlocal x = 1 -- note\n\n-- before y\ny = 2\n-- tail\n";
        let tree = parse(source).unwrap();
        let [x, y] = statements(&tree)[..] else {
            panic!("expected two statements");
        };

        assert_eq!(
            tree.trivia(x).leading,
            vec![TriviaPiece::LineComment("-- header".to_string())]
        );
        assert_eq!(
            tree.trivia(x).trailing,
            vec![TriviaPiece::LineComment("-- note".to_string())]
        );
        assert_eq!(
            tree.trivia(y).leading,
            vec![
                TriviaPiece::BlankLine,
                TriviaPiece::LineComment("-- before y".to_string())
            ]
        );
        assert_eq!(
            tree.trivia(tree.root()).trailing,
            vec![TriviaPiece::LineComment("-- tail".to_string())]
        );
    }

    #[test]
    fn test_comment_before_end_belongs_to_block() {
        let tree = parse("do\n  x()\n  -- last\nend").unwrap();
        let body = tree.children(first(&tree))[0];
        assert_eq!(
            tree.trivia(body).trailing,
            vec![TriviaPiece::LineComment("-- last".to_string())]
        );
    }

    #[test]
    fn test_spans_cover_statements() {
        let source = "local x = 1\nprint(x)";
        let tree = parse(source).unwrap();
        let call = statements(&tree)[1];
        let span = tree.span(call).unwrap();
        assert_eq!(&source[span.start as usize..span.end as usize], "print(x)");
    }
}
