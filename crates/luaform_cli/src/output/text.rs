//! Text output formatter

use luaform_core::{Diagnostic, Severity, TransformationResult};

/// Prints every diagnostic to stderr as `name:line:column: severity[kind]: message`.
pub fn report_diagnostics(result: &TransformationResult, source_name: &str) {
    for diag in &result.diagnostics {
        eprintln!("{}", format_diagnostic(diag, source_name));
    }
}

fn format_diagnostic(diag: &Diagnostic, source_name: &str) -> String {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };
    let mut line = format!(
        "{}:{}:{}: {}[{}]: {}",
        source_name,
        diag.line,
        diag.column,
        severity,
        diag.kind.as_str(),
        diag.message
    );
    if let Some(rule) = &diag.rule {
        line.push_str(&format!(" ({rule})"));
    }
    line
}
