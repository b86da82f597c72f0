//! Rule and configuration error types.

use luaform_ast::{NodeId, StructuralError};
use thiserror::Error;

/// A rule declined to transform the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule found a construct it cannot handle safely. The pipeline rolls
    /// the tree back to its state before the rule ran.
    #[error("{message}")]
    Rejected {
        message: String,
        node: Option<NodeId>,
    },

    /// A mutation primitive refused a change. Always fatal.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl RuleError {
    /// Creates a rejection pointing at the node being examined.
    pub fn at(node: NodeId, message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            node: Some(node),
        }
    }

    /// Creates a rejection that is not tied to a node.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            node: None,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            RuleError::Rejected { node, .. } => *node,
            RuleError::Structural(_) => None,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, RuleError::Structural(_))
    }
}

/// A problem with the pipeline configuration, found before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },

    #[error("invalid options for rule '{rule}': {message}")]
    InvalidOptions { rule: String, message: String },

    #[error("rule '{before}' must run before '{after}' (expected order: {})", expected.join(", "))]
    Order {
        before: String,
        after: String,
        expected: Vec<String>,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::UnknownRule { name: name.into() }
    }

    pub fn invalid_options(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// The rule this error is about, if any.
    pub fn rule(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownRule { name } => Some(name),
            ConfigError::InvalidOptions { rule, .. } => Some(rule),
            ConfigError::Order { after, .. } => Some(after),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::unknown_rule("fold").to_string(),
            "unknown rule 'fold'"
        );
        let order = ConfigError::Order {
            before: "constant-folding".into(),
            after: "dead-branch-elimination".into(),
            expected: vec!["constant-folding".into(), "dead-branch-elimination".into()],
        };
        assert_eq!(
            order.to_string(),
            "rule 'constant-folding' must run before 'dead-branch-elimination' \
             (expected order: constant-folding, dead-branch-elimination)"
        );
        assert_eq!(order.rule(), Some("dead-branch-elimination"));
    }

    #[test]
    fn test_structural_errors_are_flagged() {
        let error = RuleError::from(StructuralError::RootMutation("removed"));
        assert!(error.is_structural());
        assert_eq!(error.node(), None);
        assert!(!RuleError::rejected("no").is_structural());
    }
}
