//! Totals for the kinds that do not add pool fields.

use std::collections::BTreeMap;

use ic_core::setting::SettingEffect;
use ic_core::{Item, ItemId, SettingMode, make_compare_ready};
use serde::Serialize;

use crate::aggregate::for_each_used;
use crate::book::RuleBook;
use crate::context::QueryContext;

/// Summed movement bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementBonus {
    /// Added to stride.
    pub stride: i32,
    /// Added to dash.
    pub dash: i32,
    /// Added to run.
    pub run: i32,
    /// Whether any applied bonus ignores bad footing.
    pub ignore_bad_footing: bool,
}

/// A reroll a gift grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RerollGrant {
    /// The granting gift.
    pub gift: ItemId,
    /// Exhaust the gift when the reroll is used.
    pub exhausts_on_use: bool,
    /// Alternative identifier shown for the reroll.
    pub identifier_override: Option<String>,
}

/// Reroll type available on any roll containing a one.
pub const BASIC_REROLL: &str = "ONE";

/// Accumulated effect of one non-pool kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BonusTotals {
    /// Movement bonuses (move and flying kinds).
    pub movement: MovementBonus,
    /// Encumbrance limit bonus.
    pub encumbrance: f64,
    /// Largest range penalty reduction.
    pub range_reduction: u32,
    /// Currency value overrides by currency key; last one wins.
    pub currency_values: BTreeMap<String, String>,
    /// Granted reroll types; last one wins.
    pub rerolls: BTreeMap<String, RerollGrant>,
}

/// Fold every applicable rule of `mode` into totals.
pub fn totals(book: &RuleBook<'_>, mode: SettingMode, ctx: &QueryContext<'_>) -> BonusTotals {
    let mut acc = BonusTotals::default();
    for_each_used(book, mode, ctx, |used| match &used.setting.effect {
        SettingEffect::MoveBonus(m) | SettingEffect::FlyingBonus(m) => {
            acc.movement.stride += m.bonus_stride;
            acc.movement.dash += m.bonus_dash;
            acc.movement.run += m.bonus_run;
            acc.movement.ignore_bad_footing |= m.ignore_bad_footing;
        }
        SettingEffect::EncumbranceBonus(e) => acc.encumbrance += e.encumbrance_bonus,
        SettingEffect::RangePenaltyReduction(r) => {
            acc.range_reduction = acc.range_reduction.max(r.penalty_reduction);
        }
        SettingEffect::CurrencyValueChange(c) => {
            acc.currency_values
                .insert(make_compare_ready(&c.currency_name), c.currency_value.clone());
        }
        SettingEffect::RerollBonus(r) => {
            acc.rerolls.insert(
                r.reroll_type.clone(),
                RerollGrant {
                    gift: used.item.id,
                    exhausts_on_use: r.bonus_exhausts_on_use,
                    identifier_override: r.identifier_override.clone(),
                },
            );
        }
        other => {
            tracing::debug!(mode = ?other.mode(), "kind has no totals");
        }
    });
    acc
}

/// Reroll types available for a roll with the given stats.
///
/// The basic reroll is offered (with no grant) whenever the roll has a one
/// and `add_basic` is set.
pub fn reroll_types(
    book: &RuleBook<'_>,
    ctx: &QueryContext<'_>,
    add_basic: bool,
) -> BTreeMap<String, Option<RerollGrant>> {
    let grants = totals(book, SettingMode::RerollBonus, ctx).rerolls;
    let mut types: BTreeMap<String, Option<RerollGrant>> = grants
        .into_iter()
        .map(|(k, v)| (k, Some(v)))
        .collect();
    if ctx.has_one_in_roll && add_basic {
        types.insert(BASIC_REROLL.to_string(), None);
    }
    types
}

/// Range penalty reduction for an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeReduction {
    /// Range bands of penalty removed.
    pub reduction: u32,
    /// Whether the range penalty field should start checked.
    pub autocheck: bool,
}

/// Largest applicable range penalty reduction for attacking with `item`.
///
/// Magic attacks made while a wand is readied do not autocheck the range
/// penalty.
pub fn range_penalty_reduction(book: &RuleBook<'_>, ctx: &QueryContext<'_>) -> RangeReduction {
    let reduction = totals(book, SettingMode::RangePenaltyReduction, ctx).range_reduction;
    let magic = ctx
        .item
        .is_some_and(|i| i.descriptors().iter().any(|d| d == "magic"));
    let wand_ready = book
        .actor()
        .items
        .iter()
        .any(|i: &Item| i.is_readied() && i.descriptors().iter().any(|d| d == "wand"));
    RangeReduction {
        reduction,
        autocheck: !(magic && wand_ready),
    }
}
