//! # luaform_rules
//!
//! Rewrite rules for the luaform Lua transformation engine.
//!
//! This crate provides:
//! - The [`Rule`] trait and the [`RuleContext`] a rule reports through
//! - The built-in rules and the [`RuleRegistry`] that builds them from
//!   configuration
//! - The partial order rules declare between each other
//! - Lexical scope analysis and a constant evaluator with Lua 5.4 semantics
//!
//! ## Example
//!
//! ```rust
//! use luaform_ast::LineIndex;
//! use luaform_generator::{GeneratorMode, render};
//! use luaform_rules::{RuleContext, RuleRegistry};
//!
//! let source = "local x = 1 + 2";
//! let mut tree = luaform_parser::parse(source).unwrap();
//! let rule = RuleRegistry::builtin().build("constant-folding", None).unwrap();
//! let lines = LineIndex::new(source);
//! let mut ctx = RuleContext::new(rule.meta().name, &lines);
//! rule.apply(&mut tree, &mut ctx).unwrap();
//! assert_eq!(render(&tree, GeneratorMode::Readable), "local x = 3");
//! ```

mod diagnostic;
mod error;
mod registry;
mod rule;
pub mod rules;
pub mod scope;
pub mod value;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{ConfigError, RuleError};
pub use registry::{OrderViolation, RuleRegistry};
pub use rule::{BuiltinRule, Rule, RuleContext, RuleMeta};
