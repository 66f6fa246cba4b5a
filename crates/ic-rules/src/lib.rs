//! Gift rule engine and dice pool construction for Ironclaw actors.
//!
//! Indexes an actor's gift rules into a [`RuleBook`], decides which rules
//! apply to a roll, follows replacement chains, and folds the effective rules
//! into a [`PoolConstruction`]. Pools are finished into dice arrays for an
//! external [`DiceRoller`]; derived movement, encumbrance and coinage are
//! computed from the same rules.

pub mod actions;
pub mod aggregate;
pub mod applicability;
pub mod book;
pub mod config;
pub mod construction;
pub mod context;
pub mod derived;
pub mod error;
pub mod pool;
pub mod replacement;
pub mod roller;
pub mod status;
pub mod totals;
pub mod transform;
pub mod validate;

#[cfg(test)]
mod testing;

pub use actions::{Action, prepare_action};
pub use aggregate::aggregate;
pub use applicability::applies;
pub use book::{Rule, RuleBook, RuleKey};
pub use config::{Currency, EngineConfig};
pub use construction::{PoolConstruction, PoolField};
pub use context::{DefenseKind, OpposingItem, QueryContext};
pub use derived::{DerivedStats, EncumbranceStatus, derive};
pub use error::{RulesError, RulesResult};
pub use pool::{FinishedPool, PoolOptions, PoolPart, build_extra, build_pool, finish};
pub use replacement::{ChainOutcome, ReplacementMap, resolve_chain};
pub use roller::{DiceRoller, ItemStore, RollMode, RollReport, perform_roll};
pub use status::{StatusKind, status_bonus};
pub use totals::{BonusTotals, range_penalty_reduction, reroll_types, totals};
pub use validate::{ValidationIssue, validate_actor};
