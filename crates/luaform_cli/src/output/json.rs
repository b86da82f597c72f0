//! JSON output formatter

use luaform_core::TransformationResult;

/// The result exactly as the library serializes it, one line.
pub fn render_json(result: &TransformationResult) -> String {
    format!("{}\n", result.to_json())
}
