//! Output formatting module

mod json;
mod text;

use std::io::Write;
use std::path::Path;

use luaform_core::TransformationResult;
use miette::{IntoDiagnostic, Result};

/// Writes the result in `format` to `destination`, or to stdout.
///
/// Program text is written byte for byte as the engine produced it. JSON
/// results end with a newline that is not part of the document.
pub fn output_result(
    result: &TransformationResult,
    source_name: &str,
    format: &str,
    destination: Option<&Path>,
) -> Result<()> {
    let payload = match format {
        "json" => Some(json::render_json(result)),
        _ => {
            text::report_diagnostics(result, source_name);
            result.output.clone()
        }
    };

    let Some(payload) = payload else {
        return Ok(());
    };
    match destination {
        Some(path) => std::fs::write(path, payload)
            .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e)),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(payload.as_bytes()).into_diagnostic()?;
            stdout.flush().into_diagnostic()
        }
    }
}
