//! Query contexts: the situation a rule is evaluated against.

use ic_core::{ConditionStore, Item, KeyList};
use serde::{Deserialize, Serialize};

/// Which kind of defense is being rolled.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DefenseKind {
    /// Dodging out of the way.
    Dodge,
    /// Parrying with a weapon.
    Parry,
    /// Any other defense a weapon calls for.
    Special,
}

/// What is known about the opposing side's item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpposingItem {
    /// Item name.
    pub name: String,
    /// Descriptors.
    pub descriptors: KeyList,
    /// Effects.
    pub effects: KeyList,
}

impl OpposingItem {
    /// Describe another actor's item.
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            descriptors: item.descriptors().iter().map(String::as_str).collect(),
            effects: item.effects().iter().map(String::as_str).collect(),
        }
    }
}

/// The transient situation a rule is evaluated in.
#[derive(Debug, Clone)]
pub struct QueryContext<'a> {
    /// The acting item, if any.
    pub item: Option<&'a Item>,
    /// The opposing item, if any.
    pub other_item: Option<&'a OpposingItem>,
    /// Status conditions of the acting actor.
    pub conditions: &'a dyn ConditionStore,
    /// Defense subtype being rolled.
    pub defense: Option<DefenseKind>,
    /// Stats of an itemless roll.
    pub stats: Vec<String>,
    /// Whether this evaluation decides default checkboxes.
    pub autocheck: bool,
    /// Whether the roll being inspected contains a one.
    pub has_one_in_roll: bool,
}

impl<'a> QueryContext<'a> {
    /// A context with no item and nothing but the given conditions.
    pub fn new(conditions: &'a dyn ConditionStore) -> Self {
        Self {
            item: None,
            other_item: None,
            conditions,
            defense: None,
            stats: Vec::new(),
            autocheck: false,
            has_one_in_roll: false,
        }
    }

    /// Set the acting item.
    pub fn with_item(mut self, item: &'a Item) -> Self {
        self.item = Some(item);
        self
    }

    /// Set the opposing item.
    pub fn with_other_item(mut self, other: &'a OpposingItem) -> Self {
        self.other_item = Some(other);
        self
    }

    /// Set the defense subtype.
    pub fn with_defense(mut self, defense: DefenseKind) -> Self {
        self.defense = Some(defense);
        self
    }

    /// Set the stats of an itemless roll.
    pub fn with_stats<S: AsRef<str>>(mut self, stats: &[S]) -> Self {
        self.stats = stats
            .iter()
            .map(|s| ic_core::make_compare_ready(s.as_ref()))
            .collect();
        self
    }

    /// Mark the roll as containing a one.
    pub fn with_one_in_roll(mut self, has_one: bool) -> Self {
        self.has_one_in_roll = has_one;
        self
    }

    /// The same context evaluated for default checkboxes.
    pub fn autochecking(&self) -> Self {
        Self {
            autocheck: true,
            ..self.clone()
        }
    }
}
