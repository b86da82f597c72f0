//! Engine error types.

use luaform_rules::ConfigError;
use thiserror::Error;

/// Errors raised while loading a configuration from disk.
///
/// Everything that happens during a transformation is reported through
/// diagnostics instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
