//! Replacement links between rules and cycle-safe chain resolution.
//!
//! A rule naming another gift in `replaceName` supersedes that gift's first
//! rule of the same kind. Links form a graph keyed by [`RuleKey`]; chains are
//! walked iteratively with a visited set, so a cyclic authoring mistake ends
//! the walk instead of looping.

use std::collections::{HashMap, HashSet};

use crate::applicability::applies;
use crate::book::{BookIssue, IssueKind, Rule, RuleBook, RuleKey};
use crate::context::QueryContext;

/// Links from a rule to the rule that supersedes it.
#[derive(Debug, Clone, Default)]
pub struct ReplacementMap {
    links: HashMap<RuleKey, RuleKey>,
}

impl ReplacementMap {
    /// Link every rule with a `replaceName` to its target.
    ///
    /// Unresolvable and self-referencing replacements are logged and
    /// returned as issues; the offending rule stays inert.
    pub fn link(rules: &[Rule<'_>]) -> (Self, Vec<BookIssue>) {
        let mut map = Self::default();
        let mut issues = Vec::new();

        for rule in rules {
            let Some(target_name) = rule.replace_target() else {
                continue;
            };
            let target_gift = rules
                .iter()
                .find(|r| r.item.key() == target_name)
                .map(|r| r.item.id);
            let target = rules
                .iter()
                .find(|r| Some(r.item.id) == target_gift && r.mode() == rule.mode());

            let Some(target) = target else {
                tracing::warn!(
                    gift = %rule.gift_name(),
                    target = %target_name,
                    mode = %rule.mode(),
                    "replacement target not found"
                );
                issues.push(BookIssue {
                    rule: rule.key(),
                    gift: rule.gift_name().to_string(),
                    kind: IssueKind::UnresolvedReplacement,
                    message: format!("no {} rule on a gift named '{target_name}'", rule.mode()),
                });
                continue;
            };

            if target.item.id == rule.item.id {
                tracing::warn!(gift = %rule.gift_name(), "gift tries to replace its own rule");
                issues.push(BookIssue {
                    rule: rule.key(),
                    gift: rule.gift_name().to_string(),
                    kind: IssueKind::SelfReplacement,
                    message: "a gift cannot replace its own rules".into(),
                });
                continue;
            }

            if let Some(previous) = map.links.insert(target.key(), rule.key()) {
                tracing::debug!(
                    target = %target.key(),
                    %previous,
                    by = %rule.key(),
                    "replacement overridden"
                );
            }
        }
        (map, issues)
    }

    /// The rule that supersedes `key`, if any.
    pub fn replacement_of(&self, key: RuleKey) -> Option<RuleKey> {
        self.links.get(&key).copied()
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if there are no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Result of walking a replacement chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainOutcome<'a> {
    /// The rule whose effects apply.
    pub used: Rule<'a>,
    /// Number of substitutions made.
    pub steps: usize,
    /// Whether the walk stopped on a cycle.
    pub cycle_detected: bool,
}

/// The rule directly superseding `rule`, if any.
pub fn resolve<'a>(book: &RuleBook<'a>, rule: Rule<'a>) -> Option<Rule<'a>> {
    book.replacements()
        .replacement_of(rule.key())
        .and_then(|key| book.rule(key))
}

/// Follow replacements from `rule` for as long as each one applies.
///
/// The last applicable link wins. On a cycle the walk stops at the last link
/// reached and logs a single warning.
pub fn resolve_chain<'a>(
    book: &RuleBook<'a>,
    rule: Rule<'a>,
    ctx: &QueryContext<'_>,
) -> ChainOutcome<'a> {
    let mut used = rule;
    let mut steps = 0;
    let mut visited = HashSet::from([rule.key()]);

    while let Some(next) = resolve(book, used) {
        if visited.contains(&next.key()) {
            tracing::warn!(
                start = %rule.key(),
                at = %used.key(),
                gift = %used.gift_name(),
                "replacement cycle detected"
            );
            return ChainOutcome {
                used,
                steps,
                cycle_detected: true,
            };
        }
        if !applies(book, next, ctx) {
            break;
        }
        visited.insert(next.key());
        used = next;
        steps += 1;
    }

    ChainOutcome {
        used,
        steps,
        cycle_detected: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{actor, count_warnings};
    use ic_core::{Conditions, SettingMode};
    use serde_json::{Value, json};

    fn gift(name: &str, settings: Value) -> Value {
        json!({"name": name, "type": "gift", "specialSettings": settings})
    }

    #[test]
    fn chain_follows_applicable_links() {
        let actor = actor(json!({"items": [
            gift("Base", json!([{"settingMode": "moveBonus", "bonusDash": 1}])),
            gift("Better", json!([
                {"settingMode": "moveBonus", "bonusDash": 2, "replaceName": "Base"}
            ])),
            gift("Best", json!([
                {"settingMode": "moveBonus", "bonusDash": 3, "replaceName": "Better"}
            ]))
        ]}));
        let book = RuleBook::build(&actor);
        let conditions = Conditions::default();
        let ctx = QueryContext::new(&conditions);
        let base = book.rules(SettingMode::MoveBonus)[0];
        let outcome = resolve_chain(&book, base, &ctx);
        assert_eq!(outcome.used.gift_name(), "Best");
        assert_eq!(outcome.steps, 2);
        assert!(!outcome.cycle_detected);
    }

    #[test]
    fn chain_stops_at_inapplicable_link() {
        let actor = actor(json!({"items": [
            gift("Base", json!([{"settingMode": "moveBonus", "bonusDash": 1}])),
            gift("Better", json!([
                {"settingMode": "moveBonus", "condition": "flying", "replaceName": "Base"}
            ])),
            gift("Best", json!([{"settingMode": "moveBonus", "replaceName": "Better"}]))
        ]}));
        let book = RuleBook::build(&actor);
        let conditions = Conditions::default();
        let ctx = QueryContext::new(&conditions);
        let base = book.rules(SettingMode::MoveBonus)[0];
        assert_eq!(resolve_chain(&book, base, &ctx).used.gift_name(), "Base");

        let flying = Conditions::with_active(["flying"]);
        let ctx = QueryContext::new(&flying);
        assert_eq!(resolve_chain(&book, base, &ctx).used.gift_name(), "Best");
    }

    #[test]
    fn cycle_terminates_with_one_warning() {
        let n = 4;
        let items: Vec<Value> = (0..n)
            .map(|i| {
                let target = format!("Gift {}", (i + 1) % n);
                gift(
                    &format!("Gift {i}"),
                    json!([{"settingMode": "moveBonus", "replaceName": target}]),
                )
            })
            .collect();
        let actor = actor(json!({ "items": items }));
        let book = RuleBook::build(&actor);
        assert!(book.issues().is_empty());
        assert_eq!(book.replacements().len(), n);

        let start = book.all_rules()[0];
        let conditions = Conditions::default();
        let ctx = QueryContext::new(&conditions);
        let (outcome, warnings) = count_warnings(|| resolve_chain(&book, start, &ctx));
        assert!(outcome.cycle_detected);
        assert!(outcome.steps <= n);
        assert_eq!(outcome.steps, n - 1);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn unresolved_and_self_replacements_are_inert() {
        let actor = actor(json!({"items": [
            gift("Lonely", json!([{"settingMode": "soakBonus", "replaceName": "Nobody"}])),
            gift("Narcissus", json!([
                {"settingMode": "soakBonus"},
                {"settingMode": "soakBonus", "replaceName": "Narcissus"}
            ]))
        ]}));
        let (book, warnings) = count_warnings(|| RuleBook::build(&actor));
        assert_eq!(warnings, 2);
        assert!(book.replacements().is_empty());
        let kinds: Vec<_> = book.issues().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![IssueKind::UnresolvedReplacement, IssueKind::SelfReplacement]
        );
        assert_eq!(book.rules(SettingMode::SoakBonus).len(), 1);
    }

    #[test]
    fn later_replacer_wins_the_link() {
        let actor = actor(json!({"items": [
            gift("Base", json!([{"settingMode": "soakBonus"}])),
            gift("First", json!([{"settingMode": "soakBonus", "replaceName": "Base"}])),
            gift("Second", json!([{"settingMode": "soakBonus", "replaceName": "Base"}]))
        ]}));
        let book = RuleBook::build(&actor);
        let base = book.rules(SettingMode::SoakBonus)[0];
        assert_eq!(resolve(&book, base).unwrap().gift_name(), "Second");
    }
}
