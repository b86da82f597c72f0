//! Rule registry and the declared partial order between rules.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::rule::{BuiltinRule, Rule, RuleMeta};
use crate::rules::{
    CallInlining, ConstantFolding, ConvertIndexToField, DeadBranchElimination, IdentifierRenaming,
    Minify, RemoveCallParens, RemoveEmptyDo, RemoveNilDeclaration, StringEncoding,
};

type Factory = fn(Option<&Value>) -> Result<Box<dyn Rule>, String>;

#[derive(Debug, Clone, Copy)]
struct RuleEntry {
    meta: &'static RuleMeta,
    factory: Factory,
}

impl RuleEntry {
    fn of<R: BuiltinRule>() -> Self {
        Self {
            meta: R::META,
            factory: build_rule::<R>,
        }
    }
}

fn build_rule<R: BuiltinRule>(options: Option<&Value>) -> Result<Box<dyn Rule>, String> {
    let options = match options {
        None | Some(Value::Null) => R::Options::default(),
        Some(value) => <R::Options as Deserialize>::deserialize(value).map_err(|e| e.to_string())?,
    };
    Ok(Box::new(R::from_options(options)?))
}

/// A "`before` must run before `after`" constraint broken by a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    pub before: String,
    pub after: String,
}

/// The set of rules a configuration can name.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    entries: Vec<RuleEntry>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleRegistry {
    /// All built-in rules, in their recommended order.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                RuleEntry::of::<CallInlining>(),
                RuleEntry::of::<ConstantFolding>(),
                RuleEntry::of::<DeadBranchElimination>(),
                RuleEntry::of::<RemoveEmptyDo>(),
                RuleEntry::of::<RemoveNilDeclaration>(),
                RuleEntry::of::<ConvertIndexToField>(),
                RuleEntry::of::<RemoveCallParens>(),
                RuleEntry::of::<StringEncoding>(),
                RuleEntry::of::<IdentifierRenaming>(),
                RuleEntry::of::<Minify>(),
            ],
        }
    }

    pub fn metas(&self) -> impl Iterator<Item = &'static RuleMeta> + '_ {
        self.entries.iter().map(|entry| entry.meta)
    }

    pub fn get(&self, name: &str) -> Option<&'static RuleMeta> {
        self.entry(name).map(|entry| entry.meta)
    }

    fn entry(&self, name: &str) -> Option<&RuleEntry> {
        self.entries.iter().find(|entry| entry.meta.name == name)
    }

    /// Builds the rule `name` from its configured options. Missing or `null`
    /// options select the defaults.
    pub fn build(&self, name: &str, options: Option<&Value>) -> Result<Box<dyn Rule>, ConfigError> {
        let entry = self.entry(name).ok_or_else(|| ConfigError::unknown_rule(name))?;
        (entry.factory)(options).map_err(|message| ConfigError::invalid_options(name, message))
    }

    /// Every declared `(before, after)` pair, from both sides of the
    /// declarations.
    pub fn constraints(&self) -> BTreeSet<(&'static str, &'static str)> {
        let mut constraints = BTreeSet::new();
        for meta in self.metas() {
            constraints.extend(meta.runs_before.iter().map(|&after| (meta.name, after)));
            constraints.extend(meta.runs_after.iter().map(|&before| (before, meta.name)));
        }
        constraints
    }

    /// Constraints broken by running `names` in the given order.
    ///
    /// "A before B" is broken when both are configured and some occurrence
    /// of B comes before the first occurrence of A.
    pub fn check_order(&self, names: &[&str]) -> Vec<OrderViolation> {
        let first = |name: &str| names.iter().position(|&configured| configured == name);
        self.constraints()
            .into_iter()
            .filter_map(|(before, after)| {
                let (before_at, after_at) = (first(before)?, first(after)?);
                (after_at < before_at).then(|| OrderViolation {
                    before: before.to_string(),
                    after: after.to_string(),
                })
            })
            .collect()
    }

    /// Distinct configured names in an order that satisfies every
    /// constraint between them. Ties keep the configured order.
    pub fn suggested_order(&self, names: &[&str]) -> Vec<String> {
        let mut rules: Vec<&str> = Vec::new();
        for &name in names {
            if !rules.contains(&name) {
                rules.push(name);
            }
        }

        let edges: Vec<(usize, usize)> = self
            .constraints()
            .into_iter()
            .filter_map(|(before, after)| {
                let from = rules.iter().position(|&rule| rule == before)?;
                let to = rules.iter().position(|&rule| rule == after)?;
                Some((from, to))
            })
            .collect();
        let mut in_degree = vec![0usize; rules.len()];
        for &(_, to) in &edges {
            in_degree[to] += 1;
        }

        let mut placed = vec![false; rules.len()];
        let mut result = Vec::with_capacity(rules.len());
        while result.len() < rules.len() {
            // Lowest configured position among the rules that are ready; a
            // cycle falls back to the lowest unplaced position.
            let next = (0..rules.len())
                .find(|&index| !placed[index] && in_degree[index] == 0)
                .or_else(|| (0..rules.len()).find(|&index| !placed[index]));
            let Some(next) = next else {
                break;
            };
            placed[next] = true;
            result.push(rules[next].to_string());
            for &(from, to) in &edges {
                if from == next && in_degree[to] > 0 {
                    in_degree[to] -= 1;
                }
            }
        }
        debug!(order = ?result, "computed rule order");
        result
    }
}
