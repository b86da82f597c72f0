//! The rule contract.

use std::fmt;

use luaform_ast::{LineIndex, NodeId, Position, Span, SyntaxTree};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::error::RuleError;

/// Static description of a rule, including its declared ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleMeta {
    pub name: &'static str,
    pub description: &'static str,
    /// Rules that must not run before this one, if configured.
    pub runs_before: &'static [&'static str],
    /// Rules that must not run after this one, if configured.
    pub runs_after: &'static [&'static str],
}

/// A tree-to-tree rewrite.
///
/// `apply` either leaves the tree well-formed or returns an error; the
/// pipeline restores the previous tree whenever an error comes back.
pub trait Rule: fmt::Debug + Send + Sync {
    fn meta(&self) -> &'static RuleMeta;

    fn apply(&self, tree: &mut SyntaxTree, ctx: &mut RuleContext<'_>) -> Result<(), RuleError>;
}

/// A rule the registry can build from configuration options.
pub trait BuiltinRule: Rule + Sized + 'static {
    const META: &'static RuleMeta;

    type Options: DeserializeOwned + Default;

    /// Checks option values that deserialization cannot express.
    fn from_options(options: Self::Options) -> Result<Self, String>;
}

/// Per-run state handed to a rule.
#[derive(Debug)]
pub struct RuleContext<'a> {
    rule: &'static str,
    lines: &'a LineIndex<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> RuleContext<'a> {
    pub fn new(rule: &'static str, lines: &'a LineIndex<'a>) -> Self {
        Self {
            rule,
            lines,
            diagnostics: Vec::new(),
        }
    }

    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn lines(&self) -> &LineIndex<'a> {
        self.lines
    }

    /// Source span and position of `node`, falling back to its ancestors for
    /// nodes created by rules.
    pub fn locate(&self, tree: &SyntaxTree, node: NodeId) -> (Option<Span>, Position) {
        match tree.span_of(node) {
            Some(span) => (Some(span), self.lines.start_of(span)),
            None => (None, Position::default()),
        }
    }

    /// Records a rule diagnostic at `node`.
    pub fn report(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        severity: Severity,
        message: impl Into<String>,
    ) {
        let diagnostic = self.diagnostic_at(tree, Some(node), message).with_severity(severity);
        self.diagnostics.push(diagnostic);
    }

    pub fn info(&mut self, tree: &SyntaxTree, node: NodeId, message: impl Into<String>) {
        self.report(tree, node, Severity::Info, message);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Describes a rule failure, naming the kind and position of the node the
    /// rule was examining.
    pub fn failure(&self, tree: &SyntaxTree, error: &RuleError, severity: Severity) -> Diagnostic {
        let kind = if error.is_structural() {
            DiagnosticKind::Structural
        } else {
            DiagnosticKind::Rule
        };
        let node = error.node().filter(|&node| tree.get(node).is_some());
        let message = match node {
            Some(node) => format!("{error} ({})", tree.kind(node).name()),
            None => error.to_string(),
        };
        let mut diagnostic = self.diagnostic_at(tree, node, message).with_severity(severity);
        diagnostic.kind = kind;
        diagnostic
    }

    fn diagnostic_at(
        &self,
        tree: &SyntaxTree,
        node: Option<NodeId>,
        message: impl Into<String>,
    ) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(DiagnosticKind::Rule, message).with_rule(self.rule);
        if let Some(node) = node {
            let (span, position) = self.locate(tree, node);
            diagnostic = diagnostic.with_position(position);
            if let Some(span) = span {
                diagnostic = diagnostic.with_span(span);
            }
        }
        diagnostic
    }
}
