//! The rule book: every special setting of an actor, indexed for evaluation.
//!
//! A [`RuleBook`] borrows an actor snapshot and is rebuilt whenever the
//! actor's items change. Building it checks every rule against the setting
//! schema and links replacement rules; problems are logged once here and
//! kept as [`BookIssue`]s, never raised as errors.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use ic_core::item::Gift;
use ic_core::setting::problems;
use ic_core::{Actor, Item, ItemId, SettingMode, SpecialSetting, make_compare_ready};

use crate::replacement::ReplacementMap;

/// Identifies a rule by its granting gift and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    /// The granting gift.
    pub item: ItemId,
    /// Index into the gift's special settings.
    pub index: usize,
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.item, self.index)
    }
}

/// A borrowed view of one rule and the gift granting it.
#[derive(Debug, Clone, Copy)]
pub struct Rule<'a> {
    /// The granting item.
    pub item: &'a Item,
    /// The granting item's gift data.
    pub gift: &'a Gift,
    /// Index into the gift's special settings.
    pub index: usize,
    /// The rule itself.
    pub setting: &'a SpecialSetting,
    /// The rule's kind.
    pub mode: SettingMode,
}

impl<'a> Rule<'a> {
    /// The rule's key.
    pub fn key(&self) -> RuleKey {
        RuleKey {
            item: self.item.id,
            index: self.index,
        }
    }

    /// The rule's kind.
    pub fn mode(&self) -> SettingMode {
        self.mode
    }

    /// Name of the granting gift.
    pub fn gift_name(&self) -> &'a str {
        &self.item.name
    }

    /// Compare-ready name of the gift this rule replaces, if any.
    pub fn replace_target(&self) -> Option<String> {
        self.setting
            .replace_name
            .as_deref()
            .map(make_compare_ready)
            .filter(|n| !n.is_empty())
    }
}

/// What went wrong with a rule while building the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The rule breaks the setting schema and never applies.
    Malformed,
    /// The rule replaces a gift or rule that does not exist.
    UnresolvedReplacement,
    /// The rule tries to replace a rule of its own gift.
    SelfReplacement,
}

/// A problem found while building the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookIssue {
    /// The offending rule.
    pub rule: RuleKey,
    /// Name of the granting gift.
    pub gift: String,
    /// Kind of problem.
    pub kind: IssueKind,
    /// Human readable description.
    pub message: String,
}

/// Every rule of an actor, grouped by kind, with replacements linked.
#[derive(Debug)]
pub struct RuleBook<'a> {
    actor: &'a Actor,
    rules: Vec<Rule<'a>>,
    lookup: HashMap<RuleKey, usize>,
    base: BTreeMap<SettingMode, Vec<Rule<'a>>>,
    replacements: ReplacementMap,
    malformed: HashSet<RuleKey>,
    issues: Vec<BookIssue>,
}

impl<'a> RuleBook<'a> {
    /// Index every special setting of every gift the actor carries.
    pub fn build(actor: &'a Actor) -> Self {
        let mut rules = Vec::new();
        let mut malformed = HashSet::new();
        let mut issues = Vec::new();

        for item in &actor.items {
            let Some(gift) = item.as_gift() else {
                continue;
            };
            for (index, setting) in gift.special_settings.iter().enumerate() {
                let key = RuleKey {
                    item: item.id,
                    index,
                };
                let found = problems(setting);
                if !found.is_empty() {
                    let message = found.join("; ");
                    tracing::warn!(gift = %item.name, index, %message, "ignoring malformed rule");
                    malformed.insert(key);
                    issues.push(BookIssue {
                        rule: key,
                        gift: item.name.clone(),
                        kind: IssueKind::Malformed,
                        message,
                    });
                }
                let Some(mode) = setting.mode() else {
                    continue;
                };
                rules.push(Rule {
                    item,
                    gift,
                    index,
                    setting,
                    mode,
                });
            }
        }

        let (replacements, link_issues) = ReplacementMap::link(&rules);
        issues.extend(link_issues);

        let mut base: BTreeMap<SettingMode, Vec<Rule<'a>>> = BTreeMap::new();
        for rule in rules.iter().filter(|r| r.replace_target().is_none()) {
            base.entry(rule.mode()).or_default().push(*rule);
        }
        let lookup = rules
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key(), i))
            .collect();

        Self {
            actor,
            rules,
            lookup,
            base,
            replacements,
            malformed,
            issues,
        }
    }

    /// The actor this book was built from.
    pub fn actor(&self) -> &'a Actor {
        self.actor
    }

    /// Base rules of a kind, in the actor's item order. Rules that replace
    /// another rule are reachable only through their target.
    pub fn rules(&self, mode: SettingMode) -> &[Rule<'a>] {
        self.base.get(&mode).map_or(&[], Vec::as_slice)
    }

    /// Every rule, base or replacing, in item order.
    pub fn all_rules(&self) -> &[Rule<'a>] {
        &self.rules
    }

    /// Look up a rule by key.
    pub fn rule(&self, key: RuleKey) -> Option<Rule<'a>> {
        self.lookup.get(&key).map(|&i| self.rules[i])
    }

    /// The replacement links.
    pub fn replacements(&self) -> &ReplacementMap {
        &self.replacements
    }

    /// Returns true if the rule failed schema checks.
    pub fn is_malformed(&self, key: RuleKey) -> bool {
        self.malformed.contains(&key)
    }

    /// Problems found while building.
    pub fn issues(&self) -> &[BookIssue] {
        &self.issues
    }
}
