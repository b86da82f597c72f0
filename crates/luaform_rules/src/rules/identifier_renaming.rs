//! Renames local variables.
//!
//! Names are planned from the scope analysis and then written to a copy of
//! the tree. The copy is analyzed again and only replaces the original when
//! every reference still resolves to the same binding or global.

use std::collections::{BTreeSet, HashSet};

use luaform_ast::{SyntaxTree, is_keyword, is_valid_identifier};
use serde::Deserialize;
use tracing::debug;

use crate::error::RuleError;
use crate::rule::{BuiltinRule, Rule, RuleContext, RuleMeta};
use crate::scope::{Binding, BindingKind, Resolution, ScopeAnalysis, rename_site};

static META: RuleMeta = RuleMeta {
    name: "identifier-renaming",
    description: "Renames local variables, parameters and local functions",
    runs_before: &["minify"],
    runs_after: &[],
};

const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NEXT_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenamingStrategy {
    /// Shortest free names: `a`, `b`, ..., `Z`, `aa`, ...
    #[default]
    Shorten,
    /// The original name behind a fixed prefix.
    Prefix,
}

/// What to do when a scope declares the same local name twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnRedeclaration {
    #[default]
    Fail,
    Allow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenamingOptions {
    pub strategy: RenamingStrategy,
    pub prefix: String,
    /// Names that are never generated.
    pub reserved: Vec<String>,
    /// Whether `local function` names are renamed.
    pub include_functions: bool,
    pub on_redeclaration: OnRedeclaration,
}

impl Default for RenamingOptions {
    fn default() -> Self {
        Self {
            strategy: RenamingStrategy::Shorten,
            prefix: "_".to_string(),
            reserved: Vec::new(),
            include_functions: true,
            on_redeclaration: OnRedeclaration::Fail,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierRenaming {
    options: RenamingOptions,
}

impl BuiltinRule for IdentifierRenaming {
    const META: &'static RuleMeta = &META;
    type Options = RenamingOptions;

    fn from_options(options: RenamingOptions) -> Result<Self, String> {
        if !options.prefix.is_empty() && !is_valid_identifier(&format!("{}a", options.prefix)) {
            return Err(format!("prefix '{}' does not start a valid name", options.prefix));
        }
        Ok(Self { options })
    }
}

impl Rule for IdentifierRenaming {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn apply(&self, tree: &mut SyntaxTree, _ctx: &mut RuleContext<'_>) -> Result<(), RuleError> {
        let analysis = ScopeAnalysis::analyze(tree);
        if self.options.on_redeclaration == OnRedeclaration::Fail
            && let Some(&(later, _)) = analysis.redeclarations().first()
        {
            let binding = analysis.binding(later);
            return Err(RuleError::at(
                binding.declaration.node,
                format!("redeclaration of local '{}'", binding.name),
            ));
        }

        let names = self.plan(&analysis)?;
        let mut renamed = tree.clone();
        let mut count = 0;
        for (binding, name) in analysis.bindings().iter().zip(&names) {
            if *name == binding.name {
                continue;
            }
            if !is_valid_identifier(name) {
                return Err(RuleError::at(
                    binding.declaration.node,
                    format!("cannot rename '{}' to '{name}'", binding.name),
                ));
            }
            rename_site(&mut renamed, binding.declaration, name)?;
            for &site in &binding.references {
                rename_site(&mut renamed, site, name)?;
            }
            count += 1;
        }

        verify(&analysis, &renamed, &names)?;
        *tree = renamed;
        debug!(renamed = count, "renamed local bindings");
        Ok(())
    }
}

impl IdentifierRenaming {
    fn is_renamed(&self, binding: &Binding) -> bool {
        match binding.kind {
            BindingKind::SelfParameter => false,
            BindingKind::LocalFunction => self.options.include_functions,
            _ => true,
        }
    }

    /// New name of every binding, indexed like `analysis.bindings()`.
    fn plan(&self, analysis: &ScopeAnalysis) -> Result<Vec<String>, RuleError> {
        let bindings = analysis.bindings();
        let mut fixed: BTreeSet<&str> = analysis.globals().iter().map(String::as_str).collect();
        fixed.extend(self.options.reserved.iter().map(String::as_str));
        fixed.extend(
            bindings
                .iter()
                .filter(|binding| !self.is_renamed(binding))
                .map(|binding| binding.name.as_str()),
        );

        let mut names: Vec<String> = Vec::with_capacity(bindings.len());
        for (id, binding) in bindings.iter().enumerate() {
            if !self.is_renamed(binding) {
                names.push(binding.name.clone());
                continue;
            }
            let name = match self.options.strategy {
                RenamingStrategy::Prefix => format!("{}{}", self.options.prefix, binding.name),
                RenamingStrategy::Shorten => {
                    // Earlier bindings in enclosing scopes may still be
                    // visible wherever this one is; bindings in sibling
                    // scopes never are, so their names can be reused.
                    let taken: HashSet<&str> = bindings[..id]
                        .iter()
                        .zip(&names)
                        .filter(|(other, _)| analysis.is_within(binding.scope, other.scope))
                        .map(|(_, name)| name.as_str())
                        .collect();
                    (0..)
                        .map(short_name)
                        .find(|candidate| {
                            !is_keyword(candidate)
                                && !fixed.contains(candidate.as_str())
                                && !taken.contains(candidate.as_str())
                        })
                        .ok_or_else(|| RuleError::rejected("ran out of names"))?
                }
            };
            names.push(name);
        }
        Ok(names)
    }
}

/// The `index`-th name of the sequence `a`..`z`, `A`..`Z`, `aa`, `ba`, ...
fn short_name(index: usize) -> String {
    let mut name = String::new();
    name.push(char::from(FIRST_CHARS[index % FIRST_CHARS.len()]));
    let mut rest = index / FIRST_CHARS.len();
    while rest > 0 {
        rest -= 1;
        name.push(char::from(NEXT_CHARS[rest % NEXT_CHARS.len()]));
        rest /= NEXT_CHARS.len();
    }
    name
}

/// Checks that every reference in `renamed` resolves like it did before.
fn verify(before: &ScopeAnalysis, renamed: &SyntaxTree, names: &[String]) -> Result<(), RuleError> {
    let after = ScopeAnalysis::analyze(renamed);
    for (&site, resolution) in before.resolutions() {
        let unchanged = match (resolution, after.resolve(site)) {
            (Resolution::Local(old), Some(Resolution::Local(new))) => {
                before.binding(*old).declaration == after.binding(*new).declaration
            }
            (Resolution::Global(old), Some(Resolution::Global(new))) => old == new,
            _ => false,
        };
        if unchanged {
            continue;
        }
        let message = match resolution {
            Resolution::Local(old) => format!(
                "renaming '{}' to '{}' would make this reference name another variable",
                before.binding(*old).name,
                names[*old]
            ),
            Resolution::Global(name) => {
                format!("renaming would capture the global '{name}'")
            }
        };
        return Err(RuleError::at(site.node, message));
    }
    Ok(())
}
