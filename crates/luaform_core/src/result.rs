//! The outcome of one transformation.

use luaform_rules::Diagnostic;
use serde::{Deserialize, Serialize};

/// What a host receives back: the output text when the transformation
/// succeeded, and every diagnostic in the order it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationResult {
    pub success: bool,

    /// Present exactly when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    pub diagnostics: Vec<Diagnostic>,
}

impl TransformationResult {
    pub fn success(output: String, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            success: true,
            output: Some(output),
            diagnostics,
        }
    }

    pub fn failure(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            success: false,
            output: None,
            diagnostics,
        }
    }

    /// Compact JSON, identical for every host.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luaform_ast::Position;
    use luaform_rules::{DiagnosticKind, Severity};

    #[test]
    fn test_output_is_omitted_on_failure() {
        let diagnostic = Diagnostic::new(DiagnosticKind::Parse, "unfinished string")
            .with_position(Position::new(1, 11));
        let result = TransformationResult::failure(vec![diagnostic]);
        insta::assert_snapshot!(
            result.to_json(),
            @r#"{"success":false,"diagnostics":[{"severity":"error","kind":"parse","message":"unfinished string","line":1,"column":11}]}"#
        );
    }

    #[test]
    fn test_success_round_trips() {
        let info = Diagnostic::new(DiagnosticKind::Rule, "skipped")
            .with_severity(Severity::Info)
            .with_rule("call-inlining");
        let result = TransformationResult::success("local x = 3".to_string(), vec![info]);
        let parsed: TransformationResult = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(parsed, result);
    }
}
