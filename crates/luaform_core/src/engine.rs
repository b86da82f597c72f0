//! The host-facing entry point.

use luaform_rules::{Diagnostic, RuleRegistry};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use crate::result::TransformationResult;
use crate::source::{Limits, SourceUnit};

/// A transformation engine.
///
/// Created once per host and never mutated afterwards, so one engine can
/// serve any number of concurrent `process` calls. Nothing is kept between
/// calls.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    registry: RuleRegistry,
    limits: Limits,
}

impl Engine {
    /// Creates an engine with the built-in rules and default limits.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            registry: RuleRegistry::builtin(),
            limits,
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Transforms `source` as `config` describes.
    pub fn process(&self, source: &SourceUnit, config: &PipelineConfig) -> TransformationResult {
        debug!(source = source.name(), rules = config.rules.len(), "processing");
        let result = Pipeline::new(&self.registry, self.limits).run(source, config);
        info!(
            source = source.name(),
            success = result.success,
            diagnostics = result.diagnostics.len(),
            "processed"
        );
        result
    }

    /// Transforms `source` with configuration text (JSON with comments).
    /// Unreadable configuration is reported as a `config` diagnostic.
    pub fn process_json(&self, source: &str, config: &str) -> TransformationResult {
        match PipelineConfig::from_jsonc(config) {
            Ok(config) => self.process(&SourceUnit::new(source), &config),
            Err(error) => TransformationResult::failure(vec![Diagnostic::from(&error)]),
        }
    }
}

/// Transforms `source` with a throwaway engine.
pub fn process(source: &str, config: &PipelineConfig) -> TransformationResult {
    Engine::new().process(&SourceUnit::new(source), config)
}
