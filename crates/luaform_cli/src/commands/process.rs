//! Process command implementation

use std::path::Path;

use luaform_core::{
    DEFAULT_SOURCE_NAME, Engine, FailureMode, GeneratorMode, GeneratorSetting, PipelineConfig,
    SourceUnit,
};
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::cli::Cli;
use crate::output::output_result;

/// Command-line flags that take precedence over the config file.
pub struct Overrides<'a> {
    pub strict: bool,
    pub lenient: bool,
    pub mode: Option<&'a str>,
}

impl Overrides<'_> {
    fn apply(&self, config: &mut PipelineConfig) {
        if self.strict {
            config.mode = FailureMode::Strict;
        } else if self.lenient {
            config.mode = FailureMode::Lenient;
        }
        if let Some(mode) = self.mode {
            // A flag naming the configured generator keeps its column_span.
            if !names_same_generator(mode, &config.generator) {
                config.generator = GeneratorSetting::Name(mode.to_string());
            }
        }
    }
}

fn names_same_generator(name: &str, setting: &GeneratorSetting) -> bool {
    match (GeneratorMode::from_name(name), setting.mode()) {
        (Some(wanted), Ok(configured)) => wanted.name() == configured.name(),
        _ => false,
    }
}

/// Returns `Ok(true)` when the transformation failed.
pub fn run_process(
    cli: &Cli,
    input: &Path,
    overrides: Overrides<'_>,
    format: &str,
    output: Option<&Path>,
) -> Result<bool> {
    let mut config = if let Some(ref path) = cli.config {
        PipelineConfig::from_file(path).into_diagnostic()?
    } else {
        find_config()?
    };
    overrides.apply(&mut config);

    let source = read_source(input)?;
    let result = Engine::new().process(&source, &config);

    output_result(&result, source.name(), format, output)?;
    Ok(!result.success)
}

fn read_source(input: &Path) -> Result<SourceUnit> {
    if input == Path::new("-") {
        let text = std::io::read_to_string(std::io::stdin()).into_diagnostic()?;
        return Ok(SourceUnit::new(text).with_name(DEFAULT_SOURCE_NAME));
    }

    let text = std::fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read {}: {}", input.display(), e))?;
    Ok(SourceUnit::new(text).with_name(input.display().to_string()))
}

pub fn find_config() -> Result<PipelineConfig> {
    if let Some(path) = PipelineConfig::discover(".") {
        info!("Using config: {}", path.display());
        return PipelineConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(PipelineConfig::new())
}
