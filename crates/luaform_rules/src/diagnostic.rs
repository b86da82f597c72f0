//! Diagnostics reported back to the caller of a transformation.

use luaform_ast::{Position, Span};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Severity level for diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The transformation failed or a rule was rolled back in strict mode.
    #[default]
    Error,
    /// A rule was rolled back in lenient mode.
    Warning,
    /// Informational message.
    Info,
}

/// Which stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Parse,
    Config,
    Rule,
    Structural,
}

impl DiagnosticKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Config => "config",
            DiagnosticKind::Rule => "rule",
            DiagnosticKind::Structural => "structural",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub severity: Severity,

    pub kind: DiagnosticKind,

    pub message: String,

    /// 1-indexed line.
    pub line: u32,

    /// 1-indexed column, counted in characters.
    pub column: u32,

    /// The rule that produced or caused this diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Byte span in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Creates an error diagnostic at line 1, column 1.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            line: 1,
            column: 1,
            rule: None,
            span: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.line = position.line;
        self.column = position.column;
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&ConfigError> for Diagnostic {
    fn from(error: &ConfigError) -> Self {
        let diagnostic = Diagnostic::new(DiagnosticKind::Config, error.to_string());
        match error.rule() {
            Some(rule) => diagnostic.with_rule(rule),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_config_error() {
        let diag = Diagnostic::from(&ConfigError::unknown_rule("no-such-rule"));
        assert_eq!(diag.kind, DiagnosticKind::Config);
        assert_eq!(diag.message, "unknown rule 'no-such-rule'");
        assert_eq!(diag.rule.as_deref(), Some("no-such-rule"));

        let diag = Diagnostic::from(&ConfigError::invalid("bad"));
        assert_eq!(diag.rule, None);
    }

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(DiagnosticKind::Config, "unknown rule 'x'");

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!((diag.line, diag.column), (1, 1));
        assert!(diag.is_error());
    }

    #[test]
    fn test_serialized_shape() {
        let diag = Diagnostic::new(DiagnosticKind::Rule, "rolled back")
            .with_severity(Severity::Warning)
            .with_position(Position::new(2, 7))
            .with_rule("identifier-renaming");
        assert_eq!(
            serde_json::to_string(&diag).unwrap(),
            r#"{"severity":"warning","kind":"rule","message":"rolled back","line":2,"column":7,"rule":"identifier-renaming"}"#
        );

        let with_span = diag.with_span(Span::new(3, 9));
        let json = serde_json::to_value(&with_span).unwrap();
        assert_eq!(json["span"], serde_json::json!({ "start": 3, "end": 9 }));
    }
}
