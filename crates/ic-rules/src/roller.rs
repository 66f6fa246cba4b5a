//! The dice roller and item store boundaries, and committing a roll.

use ic_core::{Actor, DiceArray, ItemId};
use serde::{Deserialize, Serialize};

use crate::error::{RulesError, RulesResult};
use crate::pool::{ExhaustRecord, FinishedPool};

/// Result of a highest-die roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestRoll {
    /// Every face rolled, in pool order.
    pub faces: Vec<u32>,
    /// The highest face.
    pub highest: u32,
}

/// Result of a target-number roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetNumberRoll {
    /// Every face rolled, in pool order.
    pub faces: Vec<u32>,
    /// Faces at or above the target number.
    pub successes: u32,
    /// Whether every die rolled a one.
    pub botch: bool,
}

/// Something that rolls dice pools and reports them.
pub trait DiceRoller {
    /// Roll `pools` and keep the highest die.
    fn roll_highest(
        &mut self,
        pools: &[DiceArray],
        label: &str,
        speaker: &str,
    ) -> RulesResult<HighestRoll>;

    /// Roll `pools` against a target number.
    fn roll_target_number(
        &mut self,
        target: u32,
        pools: &[DiceArray],
        label: &str,
        speaker: &str,
    ) -> RulesResult<TargetNumberRoll>;
}

/// Persistent storage for gift exhaust flags.
pub trait ItemStore {
    /// Set a gift's exhaust flag.
    fn set_exhausted(&mut self, item: ItemId, exhausted: bool) -> RulesResult<()>;
}

impl ItemStore for Actor {
    fn set_exhausted(&mut self, item: ItemId, exhausted: bool) -> RulesResult<()> {
        self.set_gift_exhausted(item, exhausted)
            .map_err(|e| RulesError::Persist {
                item,
                message: e.to_string(),
            })
    }
}

/// Which roller mode to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    /// Keep the highest die.
    Highest,
    /// Count successes against a target number.
    TargetNumber(u32),
}

/// What the roller returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RollOutcome {
    /// A highest-die roll.
    Highest(HighestRoll),
    /// A target-number roll.
    TargetNumber(TargetNumberRoll),
}

/// A completed roll and the exhaustion it caused.
#[derive(Debug)]
pub struct RollReport {
    /// The roll.
    pub outcome: RollOutcome,
    /// Gifts that were exhausted.
    pub exhausted: Vec<ExhaustRecord>,
    /// Gifts that could not be exhausted.
    pub failures: Vec<RulesError>,
}

/// Roll a finished pool, then exhaust the gifts it used.
///
/// If the roller fails nothing is exhausted. Exhaustion is attempted for
/// every record even when one fails; failures are returned in the report.
pub fn perform_roll(
    roller: &mut dyn DiceRoller,
    store: &mut dyn ItemStore,
    pool: &FinishedPool,
    mode: RollMode,
    speaker: &str,
) -> RulesResult<RollReport> {
    let outcome = match mode {
        RollMode::Highest => {
            RollOutcome::Highest(roller.roll_highest(&pool.pools, &pool.label, speaker)?)
        }
        RollMode::TargetNumber(tn) => RollOutcome::TargetNumber(roller.roll_target_number(
            tn,
            &pool.pools,
            &pool.label,
            speaker,
        )?),
    };

    let mut exhausted = Vec::new();
    let mut failures = Vec::new();
    for record in &pool.exhaust {
        match store.set_exhausted(record.item, true) {
            Ok(()) => exhausted.push(record.clone()),
            Err(e) => {
                tracing::error!(gift = %record.name, error = %e, "could not exhaust gift");
                failures.push(e);
            }
        }
    }
    Ok(RollReport {
        outcome,
        exhausted,
        failures,
    })
}
