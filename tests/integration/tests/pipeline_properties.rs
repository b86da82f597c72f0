//! End-to-end properties of the transformation pipeline
//!
//! Every check here goes through the public entry points only: parse and
//! render for round trips, `Engine` for transformations.

use luaform_core::{
    DiagnosticKind, Engine, FailureMode, GeneratorMode, PipelineConfig, RuleEntry, Severity,
    SourceUnit, TransformationResult,
};
use luaform_generator::render;
use luaform_parser::parse;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn run(source: &str, rules: &[&str]) -> TransformationResult {
    let config = rules
        .iter()
        .fold(PipelineConfig::new(), |config, &rule| config.with_rule(rule));
    Engine::new().process(&SourceUnit::new(source), &config)
}

fn round_trip(source: &str, mode: GeneratorMode) -> (String, String) {
    let first = render(&parse(source).unwrap(), mode);
    let second = render(&parse(&first).unwrap(), mode);
    (first, second)
}

mod round_trip {
    use super::*;
    #[allow(unused_imports)]
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::comments("-- leading\nlocal x = 1 -- trailing\n--[[ block ]]\nprint(x)")]
    #[case::long_strings("local s = [==[\nline ]] one\n]==]\nprint(#s)")]
    #[case::escapes("print(\"tab\\tquote\\\"\", 'single\\'s', \"\\65\\x42\\u{43}\")")]
    #[case::tables("local t = {1, 2; x = 3, [\"y z\"] = {nested = true}}\nprint(t.x, t[\"y z\"].nested)")]
    #[case::functions("local function f(a, ...)\n  return a, ...\nend\nfunction obj.m:method(b) return self, b end")]
    #[case::loops("for i = 10, 1, -1 do print(i) end\nfor k, v in pairs(t) do end\nrepeat local n = n - 1 until n < 0\nwhile true do break end")]
    #[case::goto("::top::\ngoto top")]
    #[case::precedence("print((1 + 2) * 3, -2 ^ 2, not a == b, a .. b .. c, 2 ^ 3 ^ 2)")]
    #[case::method_calls("obj:method \"s\"\nobj:call {1}\nprint((f()))")]
    #[case::compound("local n = 1\nn += 2\nn ..= \"x\"\ncontinue_ = 1")]
    fn is_stable(
        #[case] source: &str,
        #[values(GeneratorMode::Readable, GeneratorMode::dense())] mode: GeneratorMode,
    ) {
        let (first, second) = round_trip(source, mode);
        assert_eq!(first, second);
    }

    #[test]
    fn narrow_dense_output_still_parses() {
        let source = "local alpha, beta, gamma = 1, 2, 3\nprint(alpha + beta + gamma)\nreturn alpha";
        let (first, second) = round_trip(source, GeneratorMode::Dense { column_span: 10 });
        assert_eq!(first, second);
        assert!(first.lines().count() > 1);
    }
}

mod generated_programs {
    use super::*;
    #[allow(unused_imports)]
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn identifier() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "value", "count", "_x1"]).prop_map(str::to_string)
    }

    fn expression() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            (0u32..10_000).prop_map(|n| n.to_string()),
            (0u32..100, 1u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
            "[a-z ]{0,8}".prop_map(|s| format!("\"{s}\"")),
            Just("nil".to_string()),
            Just("true".to_string()),
            identifier(),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            let operator =
                prop::sample::select(vec!["+", "-", "*", "/", "..", "==", "<", "and", "or"]);
            prop_oneof![
                (inner.clone(), operator, inner.clone())
                    .prop_map(|(l, op, r)| format!("({l} {op} {r})")),
                inner.clone().prop_map(|e| format!("not {e}")),
                prop::collection::vec(inner.clone(), 0..3)
                    .prop_map(|items| format!("{{{}}}", items.join(", "))),
                (identifier(), inner).prop_map(|(f, e)| format!("{f}({e})")),
            ]
        })
    }

    fn statement() -> impl Strategy<Value = String> {
        let simple = prop_oneof![
            (identifier(), expression()).prop_map(|(n, e)| format!("local {n} = {e}")),
            (identifier(), expression()).prop_map(|(n, e)| format!("{n} = {e}")),
            expression().prop_map(|e| format!("print({e})")),
        ];
        simple.prop_recursive(2, 12, 3, |inner| {
            prop_oneof![
                (expression(), prop::collection::vec(inner.clone(), 0..3))
                    .prop_map(|(c, body)| format!("if {c} then\n{}\nend", body.join("\n"))),
                prop::collection::vec(inner, 0..3)
                    .prop_map(|body| format!("do\n{}\nend", body.join("\n"))),
            ]
        })
    }

    fn program() -> impl Strategy<Value = String> {
        prop::collection::vec(statement(), 0..6).prop_map(|stmts| stmts.join("\n"))
    }

    proptest! {
        #[test]
        fn readable_round_trip_is_stable(source in program()) {
            let (first, second) = round_trip(&source, GeneratorMode::Readable);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn dense_round_trip_is_stable(source in program()) {
            let (first, second) = round_trip(&source, GeneratorMode::dense());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn constant_folding_is_idempotent(source in program()) {
            let once = run(&source, &["constant-folding"]);
            prop_assert!(once.success);
            let once = once.output.unwrap_or_default();
            let twice = run(&once, &["constant-folding"]).output.unwrap_or_default();
            prop_assert_eq!(once, twice);
        }
    }
}

mod transformations {
    use super::*;
    #[allow(unused_imports)]
    use pretty_assertions::assert_eq;

    #[test]
    fn folds_constants() {
        let result = run("local x = 1 + 2", &["constant-folding"]);
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("local x = 3"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn removes_dead_branch_entirely() {
        let result = run("if false then print(\"x\") end", &["dead-branch-elimination"]);
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some(""));
        assert!(result.diagnostics.is_empty());
    }

    #[rstest]
    #[case::dead_branch_elimination(
        "dead-branch-elimination",
        "if true then print(1) else print(2) end\nwhile false do print(3) end\nif x then print(4) elseif nil then print(5) end"
    )]
    #[case::constant_folding(
        "constant-folding",
        "local a = 1 + 2 * 3\nlocal b = \"a\" .. \"b\" .. 1\nlocal c = not nil\nlocal d = #\"abc\""
    )]
    fn is_idempotent(#[case] rule: &str, #[case] source: &str) {
        let once = run(source, &[rule]).output.unwrap();
        let twice = run(&once, &[rule]).output.unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_rule_fails_before_parsing() {
        let result = run("this is not lua", &["no-such-rule"]);
        assert!(!result.success);
        assert_eq!(result.output, None);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Config);
    }

    #[test]
    fn out_of_order_rules_fail_before_parsing() {
        let result = run("this is not lua", &["minify", "identifier-renaming"]);
        assert!(!result.success);
        assert!(
            result
                .diagnostics
                .iter()
                .all(|d| d.kind == DiagnosticKind::Config)
        );
    }

    #[test]
    fn unterminated_string_points_at_quote() {
        let result = run("local s = 1\nprint(\"abc", &[]);
        assert!(!result.success);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::Parse);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 7));
    }

    #[rstest]
    #[case::strict(FailureMode::Strict, false)]
    #[case::lenient(FailureMode::Lenient, true)]
    fn redeclaration_follows_failure_mode(#[case] mode: FailureMode, #[case] success: bool) {
        let source = "local a = 1\nlocal a = 2";
        let config = PipelineConfig::new().with_mode(mode).with_rule(RuleEntry::with_options(
            "identifier-renaming",
            serde_json::json!({ "strategy": "shorten" }),
        ));
        let result = Engine::new().process(&SourceUnit::new(source), &config);

        assert_eq!(result.success, success);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Rule);
        if success {
            assert_eq!(result.output.as_deref(), Some(source));
            assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        } else {
            assert_eq!(result.output, None);
        }
    }

    #[test]
    fn list_equal_configurations_agree() {
        let source = "local t = {}\nt[\"key\"] = 1 + 1\nif false then t = nil end\nprint(t.key)";
        let rules = [
            "constant-folding",
            "dead-branch-elimination",
            "convert-index-to-field",
        ];
        let from_text = PipelineConfig::from_jsonc(
            r#"{
                // same list as below
                "rules": ["constant-folding", "dead-branch-elimination", "convert-index-to-field"],
            }"#,
        )
        .unwrap();

        let engine = Engine::new();
        let a = engine.process(&SourceUnit::new(source), &from_text);
        let b = run(source, &rules);
        assert_eq!(a.to_json(), b.to_json());
    }
}

mod mutation {
    use super::*;
    #[allow(unused_imports)]
    use pretty_assertions::assert_eq;
    use luaform_ast::StructuralError;

    #[test]
    fn failed_mutations_leave_tree_untouched() {
        let mut tree = parse("local x = 1\nprint(x)").unwrap();
        let before = render(&tree, GeneratorMode::Readable);
        let statements = tree.children(tree.root()).to_vec();

        assert!(matches!(
            tree.remove(tree.root()),
            Err(StructuralError::RootMutation(_))
        ));
        assert!(matches!(
            tree.insert_before(statements[0], statements[1]),
            Err(StructuralError::AlreadyAttached(_))
        ));
        assert!(matches!(
            tree.replace(statements[0], statements[1]),
            Err(StructuralError::AlreadyAttached(_))
        ));

        assert!(tree.validate().is_ok());
        assert_eq!(render(&tree, GeneratorMode::Readable), before);
    }
}
