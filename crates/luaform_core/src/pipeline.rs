//! The pipeline state machine: validate, parse, run each rule with rollback,
//! serialize.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use luaform_ast::{LineIndex, SyntaxTree};
use luaform_generator::{GeneratorMode, render};
use luaform_parser::ParseError;
use luaform_rules::{
    ConfigError, Diagnostic, DiagnosticKind, Rule, RuleContext, RuleError, RuleRegistry, Severity,
};
use tracing::{debug, warn};

use crate::config::{FailureMode, PipelineConfig};
use crate::result::TransformationResult;
use crate::source::{Limits, SourceUnit};

/// Where a pipeline run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Validating,
    Parsing,
    /// Applying the rule at `index` of `total`.
    Running { index: usize, total: usize },
    Serializing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Validating => f.write_str("validating"),
            PipelineState::Parsing => f.write_str("parsing"),
            PipelineState::Running { index, total } => {
                write!(f, "running rule {} of {total}", index + 1)
            }
            PipelineState::Serializing => f.write_str("serializing"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed => f.write_str("failed"),
        }
    }
}

/// A validated configuration, ready to run.
#[derive(Debug)]
pub(crate) struct Plan {
    pub(crate) rules: Vec<Box<dyn Rule>>,
    pub(crate) generator: GeneratorMode,
    pub(crate) mode: FailureMode,
}

/// Whether the pipeline continues after a rule.
enum Step {
    Continue,
    Stop,
}

/// One transformation. Owns the tree and the diagnostics of this run only.
pub(crate) struct Pipeline<'a> {
    registry: &'a RuleRegistry,
    limits: Limits,
    state: PipelineState,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(registry: &'a RuleRegistry, limits: Limits) -> Self {
        Self {
            registry,
            limits,
            state: PipelineState::Idle,
            diagnostics: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }

    pub(crate) fn run(&mut self, source: &SourceUnit, config: &PipelineConfig) -> TransformationResult {
        self.transition(PipelineState::Validating);
        match self.validate(config) {
            Ok(plan) => self.execute(source, &plan),
            Err(errors) => {
                for error in &errors {
                    self.diagnostics.push(Diagnostic::from(error));
                }
                self.fail()
            }
        }
    }

    /// Builds every configured rule and checks the declared order. All
    /// problems are collected, not only the first.
    fn validate(&self, config: &PipelineConfig) -> Result<Plan, Vec<ConfigError>> {
        let mut errors = Vec::new();

        let generator = config.generator.mode().map_err(|e| errors.push(e)).ok();

        let mut rules = Vec::with_capacity(config.rules.len());
        for entry in &config.rules {
            match self.registry.build(entry.name(), entry.options()) {
                Ok(rule) => rules.push(rule),
                Err(error) => errors.push(error),
            }
        }

        let names = config.rule_names();
        let violations = self.registry.check_order(&names);
        if !violations.is_empty() {
            let expected = self.registry.suggested_order(&names);
            errors.extend(violations.into_iter().map(|violation| ConfigError::Order {
                before: violation.before,
                after: violation.after,
                expected: expected.clone(),
            }));
        }

        match generator {
            Some(generator) if errors.is_empty() => Ok(Plan {
                rules,
                generator,
                mode: config.mode,
            }),
            _ => Err(errors),
        }
    }

    pub(crate) fn execute(&mut self, source: &SourceUnit, plan: &Plan) -> TransformationResult {
        self.transition(PipelineState::Parsing);
        let lines = LineIndex::new(source.text());
        let mut tree = match luaform_parser::parse_with_options(source.text(), self.limits.into()) {
            Ok(tree) => tree,
            Err(error) => {
                self.diagnostics.push(parse_diagnostic(&lines, &error));
                return self.fail();
            }
        };

        let total = plan.rules.len();
        for (index, rule) in plan.rules.iter().enumerate() {
            self.transition(PipelineState::Running { index, total });
            if let Step::Stop = self.apply_rule(rule.as_ref(), &mut tree, &lines, plan.mode) {
                return self.fail();
            }
        }

        self.transition(PipelineState::Serializing);
        if let Err(error) = tree.validate() {
            self.diagnostics
                .push(Diagnostic::new(DiagnosticKind::Structural, error.to_string()));
            return self.fail();
        }
        let output = render(&tree, plan.generator);
        self.transition(PipelineState::Done);
        TransformationResult::success(output, std::mem::take(&mut self.diagnostics))
    }

    /// Applies one rule to a snapshot-protected tree. A failed rule leaves
    /// the tree exactly as it was before the rule ran.
    fn apply_rule(
        &mut self,
        rule: &dyn Rule,
        tree: &mut SyntaxTree,
        lines: &LineIndex<'_>,
        mode: FailureMode,
    ) -> Step {
        let name = rule.meta().name;
        let snapshot = tree.clone();
        let mut ctx = RuleContext::new(name, lines);

        // Only unwinding targets get here after a panic; wasm32 aborts.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.apply(tree, &mut ctx)));
        let (diagnostic, step) = match outcome {
            Ok(Ok(())) => match tree.validate() {
                Ok(()) => {
                    debug!(rule = name, "rule applied");
                    self.diagnostics.extend(ctx.into_diagnostics());
                    return Step::Continue;
                }
                Err(error) => (
                    ctx.failure(tree, &RuleError::from(error), Severity::Error),
                    Step::Stop,
                ),
            },
            Ok(Err(error)) if error.is_structural() || mode == FailureMode::Strict => {
                (ctx.failure(tree, &error, Severity::Error), Step::Stop)
            }
            Ok(Err(error)) => (ctx.failure(tree, &error, Severity::Warning), Step::Continue),
            Err(payload) => {
                let message = format!("rule panicked: {}", panic_message(payload.as_ref()));
                let diagnostic =
                    Diagnostic::new(DiagnosticKind::Structural, message).with_rule(name);
                (diagnostic, Step::Stop)
            }
        };
        warn!(rule = name, "rule rolled back: {}", diagnostic.message);
        *tree = snapshot;
        self.diagnostics.push(diagnostic);
        step
    }

    fn fail(&mut self) -> TransformationResult {
        self.transition(PipelineState::Failed);
        TransformationResult::failure(std::mem::take(&mut self.diagnostics))
    }
}

fn parse_diagnostic(lines: &LineIndex<'_>, error: &ParseError) -> Diagnostic {
    let offset = u32::try_from(error.offset()).unwrap_or(u32::MAX);
    Diagnostic::new(DiagnosticKind::Parse, error.to_string()).with_position(lines.position(offset))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
