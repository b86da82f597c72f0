//! Rules command implementation

use luaform_core::RuleRegistry;
use miette::Result;

pub fn run_rules() -> Result<()> {
    print!("{}", describe_rules(&RuleRegistry::builtin()));
    Ok(())
}

/// One block per rule: name and description, then its ordering constraints.
fn describe_rules(registry: &RuleRegistry) -> String {
    let mut out = String::new();
    for meta in registry.metas() {
        out.push_str(&format!("{:<26} {}\n", meta.name, meta.description));
        if !meta.runs_before.is_empty() {
            out.push_str(&format!("  runs before: {}\n", meta.runs_before.join(", ")));
        }
        if !meta.runs_after.is_empty() {
            out.push_str(&format!("  runs after: {}\n", meta.runs_after.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_rule() {
        let registry = RuleRegistry::builtin();
        let text = describe_rules(&registry);
        for meta in registry.metas() {
            assert!(text.contains(meta.name), "missing {}", meta.name);
        }
        assert!(text.contains("runs before: minify"));
    }
}
