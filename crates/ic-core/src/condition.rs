//! Status conditions and the store boundary used to query them.
//!
//! The engine only ever talks to conditions by compare-ready name through
//! [`ConditionStore`]; [`Conditions`] is the in-memory store carried inside
//! actor snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::names::make_compare_ready;

/// Condition names the engine reacts to.
pub mod names {
    /// Carrying more than the unencumbered limit.
    pub const BURDENED: &str = "burdened";
    /// Carrying more than the burdened limit.
    pub const OVER_BURDENED: &str = "over-burdened";
    /// Carrying more than can be moved at all.
    pub const CANNOT_MOVE: &str = "cannotmove";
    /// Actively guarding.
    pub const GUARDING: &str = "guarding";
    /// Actively aiming.
    pub const AIMING: &str = "aiming";
    /// Airborne.
    pub const FLYING: &str = "flying";
    /// Slowed movement.
    pub const SLOWED: &str = "slowed";
    /// Unable to move.
    pub const IMMOBILIZED: &str = "immobilized";
    /// Partly buried.
    pub const HALF_BURIED: &str = "half-buried";
    /// Unable to see.
    pub const BLINDED: &str = "blinded";
}

/// Read and write access to an actor's status conditions.
pub trait ConditionStore: std::fmt::Debug {
    /// Returns true if any of the named conditions is active.
    fn has_any(&self, names: &[&str]) -> bool;

    /// Activate the named conditions.
    fn add(&mut self, names: &[&str]);

    /// Deactivate the named conditions.
    fn remove(&mut self, names: &[&str]);

    /// The quota value stored on a condition, if any.
    fn quota(&self, condition: &str) -> Option<i64>;

    /// Store a quota value on a condition.
    fn set_quota(&mut self, condition: &str, value: i64);
}

/// In-memory condition store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    /// Active condition names, compare-ready.
    active: BTreeSet<String>,
    /// Quota values keyed by condition name.
    quotas: BTreeMap<String, i64>,
}

impl Conditions {
    /// Create a store with the given conditions active.
    pub fn with_active<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            active: names.into_iter().map(make_compare_ready).collect(),
            quotas: BTreeMap::new(),
        }
    }

    /// Returns true if the named condition is active.
    pub fn has(&self, name: &str) -> bool {
        self.active.contains(&make_compare_ready(name))
    }

    /// Iterate over active condition names.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

impl ConditionStore for Conditions {
    fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    fn add(&mut self, names: &[&str]) {
        self.active.extend(names.iter().map(|n| make_compare_ready(n)));
    }

    fn remove(&mut self, names: &[&str]) {
        for name in names {
            self.active.remove(&make_compare_ready(name));
        }
    }

    fn quota(&self, condition: &str) -> Option<i64> {
        self.quotas.get(&make_compare_ready(condition)).copied()
    }

    fn set_quota(&mut self, condition: &str, value: i64) {
        self.quotas.insert(make_compare_ready(condition), value);
    }
}
