//! Pipeline configuration.

use std::fs;
use std::path::{Path, PathBuf};

use jsonc_parser::ParseOptions;
use luaform_generator::GeneratorMode;
use luaform_rules::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::EngineError;

/// What happens when a rule fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// The first failing rule fails the whole transformation.
    #[default]
    Strict,
    /// A failing rule is rolled back with a warning and the next rule runs.
    Lenient,
}

/// One entry of the `rules` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    /// String shorthand: the rule name, default options.
    Name(String),
    /// Detailed entry with options.
    Detail(RuleEntryDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntryDetail {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl RuleEntry {
    pub fn name(&self) -> &str {
        match self {
            RuleEntry::Name(name) => name,
            RuleEntry::Detail(detail) => &detail.rule,
        }
    }

    pub fn options(&self) -> Option<&Value> {
        match self {
            RuleEntry::Name(_) => None,
            RuleEntry::Detail(detail) => detail.options.as_ref(),
        }
    }

    /// An entry with explicit options.
    pub fn with_options(name: impl Into<String>, options: Value) -> Self {
        RuleEntry::Detail(RuleEntryDetail {
            rule: name.into(),
            options: Some(options),
        })
    }
}

impl From<&str> for RuleEntry {
    fn from(name: &str) -> Self {
        RuleEntry::Name(name.to_string())
    }
}

/// Output settings: a mode name, or an object with a column span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratorSetting {
    Name(String),
    Detail(GeneratorDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorDetail {
    pub name: String,
    /// Fixed width so the accepted range is the same on every target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_span: Option<u32>,
}

impl Default for GeneratorSetting {
    fn default() -> Self {
        GeneratorSetting::Name("readable".to_string())
    }
}

impl From<GeneratorMode> for GeneratorSetting {
    fn from(mode: GeneratorMode) -> Self {
        match mode {
            GeneratorMode::Readable => GeneratorSetting::Name(mode.name().to_string()),
            GeneratorMode::Dense { column_span } => GeneratorSetting::Detail(GeneratorDetail {
                name: mode.name().to_string(),
                column_span: Some(u32::try_from(column_span).unwrap_or(u32::MAX)),
            }),
        }
    }
}

impl GeneratorSetting {
    /// Resolves the setting into a generator mode.
    pub fn mode(&self) -> Result<GeneratorMode, ConfigError> {
        let (name, column_span) = match self {
            GeneratorSetting::Name(name) => (name, None),
            GeneratorSetting::Detail(detail) => (&detail.name, detail.column_span),
        };
        let mode = GeneratorMode::from_name(name)
            .ok_or_else(|| ConfigError::invalid(format!("unknown generator mode '{name}'")))?;
        match (mode, column_span) {
            (mode, None) => Ok(mode),
            (GeneratorMode::Dense { .. }, Some(column_span)) => Ok(GeneratorMode::Dense {
                column_span: usize::try_from(column_span).unwrap_or(usize::MAX),
            }),
            (GeneratorMode::Readable, Some(_)) => Err(ConfigError::invalid(
                "column_span only applies to the dense generator",
            )),
        }
    }
}

/// Configuration of one transformation: which rules run, in which order,
/// how failures are handled and how the result is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: FailureMode,

    #[serde(default)]
    pub generator: GeneratorSetting,

    /// Rules in execution order. A rule may appear more than once.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

impl PipelineConfig {
    /// Configuration file names, in lookup order.
    pub const CONFIG_FILES: &'static [&'static str] = &[".luaform.jsonc", ".luaform.json"];

    /// Creates an empty strict configuration with readable output.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl Into<RuleEntry>) -> Self {
        self.rules.push(rule.into());
        self
    }

    pub fn with_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_generator(mut self, mode: GeneratorMode) -> Self {
        self.generator = mode.into();
        self
    }

    /// Parses configuration text. Comments and trailing commas are allowed;
    /// empty text is the default configuration.
    pub fn from_jsonc(text: &str) -> Result<Self, ConfigError> {
        let value = jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
            .map_err(|e| ConfigError::invalid(format!("failed to parse configuration: {e}")))?;
        match value {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| ConfigError::invalid(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(Self::from_jsonc(&content)?)
    }

    /// Finds the configuration file in `dir`, if there is one.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Configured rule names, in order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(RuleEntry::name).collect()
    }
}
