//! Validation of an actor's stats and gift rules.
//!
//! Reports the problems the rule book found while indexing gifts, plus
//! references to stats the actor does not have.

use ic_core::Actor;

use crate::book::{IssueKind, RuleBook};

/// A warning or error found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The item or stat where the issue was found.
    pub subject: String,
    /// A human-readable description of the issue.
    pub message: String,
    /// Whether this is an error (true) or a warning (false).
    pub is_error: bool,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{level}: {}: {}", self.subject, self.message)
    }
}

/// Validate an actor.
///
/// Malformed rules and an actor with nothing to roll are errors; broken
/// replacements and unknown stats are warnings.
pub fn validate_actor(actor: &Actor) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if actor.has_no_stats() {
        issues.push(ValidationIssue {
            subject: actor.name.clone(),
            message: "actor has no traits or skills".into(),
            is_error: true,
        });
    }

    let book = RuleBook::build(actor);
    for issue in book.issues() {
        issues.push(ValidationIssue {
            subject: issue.gift.clone(),
            message: format!("rule {}: {}", issue.rule.index + 1, issue.message),
            is_error: issue.kind == IssueKind::Malformed,
        });
    }

    if !actor.has_no_stats() {
        validate_item_stats(actor, &mut issues);
    }
    issues
}

/// Every stat an item rolls with must be a trait or skill of the actor.
fn validate_item_stats(actor: &Actor, issues: &mut Vec<ValidationIssue>) {
    for item in &actor.items {
        for stat in item.roll_stats() {
            if actor.stat_dice(&stat).is_none() {
                issues.push(ValidationIssue {
                    subject: item.name.clone(),
                    message: format!("rolls unknown stat '{stat}'"),
                    is_error: false,
                });
            }
        }
    }
}
