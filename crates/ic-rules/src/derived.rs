//! Derived statistics: movement, encumbrance, carried load and coinage.

use ic_core::condition::names;
use ic_core::{ConditionStore, Die, SettingMode};
use serde::Serialize;

use crate::actions::{Action, prepare_action};
use crate::book::RuleBook;
use crate::config::EngineConfig;
use crate::context::QueryContext;
use crate::pool::{PoolOptions, build_extra, build_pool, finish};
use crate::totals::totals;

/// Grams in one stone of carried weight.
pub const GRAMS_PER_STONE: f64 = 6350.0;

/// Movement distances in paces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Movement {
    /// Careful movement.
    pub stride: i32,
    /// A quick move.
    pub dash: i32,
    /// Full speed.
    pub run: i32,
    /// Whether bad footing is ignored.
    pub ignore_bad_footing: bool,
}

const STRIDE_BLOCKERS: [&str; 4] = [
    names::SLOWED,
    names::IMMOBILIZED,
    names::HALF_BURIED,
    names::CANNOT_MOVE,
];
const DASH_BLOCKERS: [&str; 6] = [
    names::BURDENED,
    names::BLINDED,
    names::SLOWED,
    names::IMMOBILIZED,
    names::HALF_BURIED,
    names::CANNOT_MOVE,
];
const RUN_BLOCKERS: [&str; 4] = [
    names::OVER_BURDENED,
    names::IMMOBILIZED,
    names::HALF_BURIED,
    names::CANNOT_MOVE,
];

/// Compute movement from speed, body and move bonuses.
///
/// While flying, flying bonuses apply as well and run uses the sprint pool
/// instead of speed. Missing speed or body dice give no movement at all.
pub fn movement(
    book: &RuleBook<'_>,
    config: &EngineConfig,
    conditions: &dyn ConditionStore,
) -> Movement {
    let actor = book.actor();
    let speed = actor.find_trait("speed").map_or(-1, |t| t.dice.max_value());
    let body = actor.find_trait("body").map_or(-1, |t| t.dice.max_value());
    if speed <= 0 || body <= 0 {
        tracing::error!(actor = %actor.name, "speed or body dice missing");
        return Movement::default();
    }

    let burdened = conditions.has_any(&[names::BURDENED]);
    let flying = conditions.has_any(&[names::FLYING]);
    let speed = if burdened { speed.min(8) } else { speed };

    let ctx = QueryContext::new(conditions);
    let mut bonus = totals(book, SettingMode::MoveBonus, &ctx).movement;
    if flying {
        let fly = totals(book, SettingMode::FlyingBonus, &ctx).movement;
        bonus.stride += fly.stride;
        bonus.dash += fly.dash;
        bonus.run += fly.run;
        bonus.ignore_bad_footing |= fly.ignore_bad_footing;
    }

    let stride = if conditions.has_any(&STRIDE_BLOCKERS) {
        0
    } else {
        1 + bonus.stride
    };
    let dash = if conditions.has_any(&DASH_BLOCKERS) {
        0
    } else {
        round_half_up(f64::from(speed) / 2.0) as i32 + i32::from(body > speed) + bonus.dash
    };
    let run = if conditions.has_any(&RUN_BLOCKERS) {
        0
    } else {
        let pace = if flying {
            sprint_max(book, config, &ctx, burdened)
        } else {
            speed
        };
        body + pace + dash + bonus.run
    };

    Movement {
        stride,
        dash,
        run,
        ignore_bad_footing: bonus.ignore_bad_footing,
    }
}

/// Largest face in the sprint pool, or zero if it cannot be built.
fn sprint_max(
    book: &RuleBook<'_>,
    config: &EngineConfig,
    ctx: &QueryContext<'_>,
    burdened: bool,
) -> i32 {
    let construction = prepare_action(book, &Action::Sprint, ctx);
    let Ok(pool) = build_pool(book.actor(), &construction.prechecked, burdened, config) else {
        return 0;
    };
    let extra = build_extra(&construction, "", config);
    finish(&construction, pool, extra, PoolOptions::default())
        .total()
        .max_value()
        .max(0)
}

/// Carried weight thresholds in stones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EncumbranceLimits {
    /// Carrying more than this makes the actor burdened.
    pub none: i64,
    /// Carrying more than this makes the actor over-burdened.
    pub burdened: i64,
    /// Carrying more than this stops the actor moving.
    pub over_burdened: i64,
}

/// Encumbrance thresholds from the body dice and encumbrance bonuses.
pub fn encumbrance_limits(
    book: &RuleBook<'_>,
    conditions: &dyn ConditionStore,
) -> EncumbranceLimits {
    let actor = book.actor();
    let Some((count, die)) = actor.find_trait("body").and_then(|t| t.dice.leading()) else {
        tracing::error!(actor = %actor.name, "body dice missing");
        return EncumbranceLimits::default();
    };
    let ctx = QueryContext::new(conditions);
    let bonus = totals(book, SettingMode::EncumbranceBonus, &ctx).encumbrance;
    limits_for(count, die, bonus)
}

/// Halves round towards positive infinity, so -0.5 becomes 0.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn limits_for(count: u32, die: Die, bonus: f64) -> EncumbranceLimits {
    let size = f64::from(die.sides());
    let count = f64::from(count);
    EncumbranceLimits {
        none: round_half_up((size / 2.0 - 1.0) * count + bonus) as i64,
        burdened: round_half_up((size - 1.0) * count + 2.0 * bonus) as i64,
        over_burdened: round_half_up((size / 2.0 * 3.0 - 1.0) * count + 3.0 * bonus) as i64,
    }
}

/// One currency the actor carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinLine {
    /// Currency key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Coins carried.
    pub amount: u64,
    /// Value of one coin in base currency.
    pub value: f64,
    /// Weight of the coins in stones.
    pub weight: f64,
}

/// Value and weight of everything in the purse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoinageTotals {
    /// Per-currency breakdown, in configuration order.
    pub lines: Vec<CoinLine>,
    /// Total value in base currency, rounded down.
    pub value: u64,
    /// Total weight in stones.
    pub weight: f64,
}

/// Parse a currency value such as `"12"` or `"1/12"`.
pub fn parse_currency_value(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then_some(num / den)
        }
        None => text.parse().ok(),
    }
}

/// Total the actor's coins over every configured and used currency.
pub fn coinage(
    book: &RuleBook<'_>,
    config: &EngineConfig,
    conditions: &dyn ConditionStore,
) -> CoinageTotals {
    let ctx = QueryContext::new(conditions);
    let overrides = totals(book, SettingMode::CurrencyValueChange, &ctx).currency_values;
    let mut lines = Vec::new();
    let mut raw_value = 0.0;
    let mut weight = 0.0;
    for (key, currency) in config.currencies.iter().filter(|(_, c)| c.used) {
        let amount = book.actor().coinage.get(key).copied().unwrap_or(0);
        let text = overrides.get(key).unwrap_or(&currency.value);
        let value = parse_currency_value(text).unwrap_or_else(|| {
            tracing::warn!(currency = %key, value = %text, "unreadable currency value");
            0.0
        });
        let line_weight = currency.weight_grams * amount as f64 / GRAMS_PER_STONE;
        raw_value += value * amount as f64;
        weight += line_weight;
        lines.push(CoinLine {
            key: key.clone(),
            name: currency.name.clone(),
            amount,
            value,
            weight: line_weight,
        });
    }
    CoinageTotals {
        lines,
        value: raw_value.floor().max(0.0) as u64,
        weight,
    }
}

/// What the actor carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Load {
    /// Total weight in stones.
    pub weight: f64,
    /// Worn armor pieces.
    pub worn_armor: usize,
}

/// Total item weight, plus coin weight when coins weigh anything.
pub fn load(book: &RuleBook<'_>, config: &EngineConfig, coins: &CoinageTotals) -> Load {
    let actor = book.actor();
    let items: f64 = actor.items.iter().map(|i| i.total_weight()).sum();
    let coin_weight = if config.coins_have_weight {
        coins.weight
    } else {
        0.0
    };
    Load {
        weight: items + coin_weight,
        worn_armor: actor.worn_armor_count(),
    }
}

/// How encumbered the actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum EncumbranceStatus {
    /// No penalties.
    Unencumbered,
    /// Burdened.
    Burdened,
    /// Burdened and over-burdened.
    OverBurdened,
    /// Cannot move at all.
    CannotMove,
}

impl EncumbranceStatus {
    /// Classify a load against the limits.
    pub fn classify(limits: &EncumbranceLimits, load: &Load) -> Self {
        let weight = load.weight;
        if weight > limits.over_burdened as f64 || load.worn_armor > 3 {
            Self::CannotMove
        } else if weight > limits.burdened as f64 || load.worn_armor == 3 {
            Self::OverBurdened
        } else if weight > limits.none as f64 || load.worn_armor == 2 {
            Self::Burdened
        } else {
            Self::Unencumbered
        }
    }
}

/// Bring the encumbrance conditions in line with the load.
pub fn manage_encumbrance(
    limits: &EncumbranceLimits,
    load: &Load,
    store: &mut dyn ConditionStore,
) -> EncumbranceStatus {
    let status = EncumbranceStatus::classify(limits, load);
    match status {
        EncumbranceStatus::CannotMove => {
            store.add(&[names::BURDENED, names::OVER_BURDENED, names::CANNOT_MOVE]);
        }
        EncumbranceStatus::OverBurdened => {
            store.remove(&[names::CANNOT_MOVE]);
            store.add(&[names::BURDENED, names::OVER_BURDENED]);
        }
        EncumbranceStatus::Burdened => {
            store.remove(&[names::OVER_BURDENED, names::CANNOT_MOVE]);
            store.add(&[names::BURDENED]);
        }
        EncumbranceStatus::Unencumbered => {
            store.remove(&[names::BURDENED, names::OVER_BURDENED, names::CANNOT_MOVE]);
        }
    }
    tracing::debug!(%status, weight = load.weight, "encumbrance updated");
    status
}

/// Every derived statistic of an actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    /// Movement distances.
    pub movement: Movement,
    /// Encumbrance thresholds.
    pub limits: EncumbranceLimits,
    /// Carried load.
    pub load: Load,
    /// Coins carried.
    pub coinage: CoinageTotals,
    /// Encumbrance implied by the load.
    pub status: EncumbranceStatus,
}

/// Compute every derived statistic.
///
/// With automatic encumbrance enabled the encumbrance conditions in `store`
/// are updated first, so movement reflects the new load.
pub fn derive(
    book: &RuleBook<'_>,
    config: &EngineConfig,
    store: &mut dyn ConditionStore,
) -> DerivedStats {
    let coinage = coinage(book, config, &*store);
    let load = load(book, config, &coinage);
    let limits = encumbrance_limits(book, &*store);
    let status = if config.manage_encumbrance_auto {
        manage_encumbrance(&limits, &load, store)
    } else {
        EncumbranceStatus::classify(&limits, &load)
    };
    let movement = movement(book, config, &*store);
    DerivedStats {
        movement,
        limits,
        load,
        coinage,
        status,
    }
}
