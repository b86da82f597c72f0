//! Transformation input and resource limits.

use luaform_parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_SOURCE_BYTES, ParserOptions};

/// Name used for sources that do not come from a file.
pub const DEFAULT_SOURCE_NAME: &str = "input.lua";

/// The Lua program to transform. The name is only used when a host prints
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    text: String,
    name: String,
}

impl SourceUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Bounds checked before a source is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_source_bytes: usize,
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<Limits> for ParserOptions {
    fn from(limits: Limits) -> Self {
        ParserOptions {
            max_depth: limits.max_depth,
            max_source_bytes: limits.max_source_bytes,
        }
    }
}
