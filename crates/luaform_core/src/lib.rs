//! # luaform_core
//!
//! Transformation engine for luaform.
//!
//! This crate provides:
//! - Configuration loading ([`PipelineConfig`], JSON with comments)
//! - The pipeline state machine that validates the configuration, parses,
//!   runs each rule with rollback, and serializes
//! - The [`Engine`] hosts call, and the [`TransformationResult`] they get back
//! - [`EditSession`] for hosts that transform on every edit
//!
//! ## Example
//!
//! ```rust
//! use luaform_core::{Engine, PipelineConfig, SourceUnit};
//!
//! let engine = Engine::new();
//! let config = PipelineConfig::from_jsonc(r#"{ "rules": ["constant-folding"] }"#).unwrap();
//! let result = engine.process(&SourceUnit::new("local x = 1 + 2"), &config);
//! assert!(result.success);
//! assert_eq!(result.output.as_deref(), Some("local x = 3"));
//! ```

mod config;
mod engine;
mod error;
mod pipeline;
mod result;
mod session;
mod source;

pub use config::{
    FailureMode, GeneratorDetail, GeneratorSetting, PipelineConfig, RuleEntry, RuleEntryDetail,
};
pub use engine::{Engine, process};
pub use error::EngineError;
pub use pipeline::PipelineState;
pub use result::TransformationResult;
pub use session::{EditSession, Ticket};
pub use source::{DEFAULT_SOURCE_NAME, Limits, SourceUnit};

pub use luaform_generator::GeneratorMode;
pub use luaform_rules::{ConfigError, Diagnostic, DiagnosticKind, RuleMeta, RuleRegistry, Severity};
