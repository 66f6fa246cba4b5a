//! Folding an actor's pool bonus rules into a pool construction.

use ic_core::setting::{AutoUse, BonusSource};
use ic_core::{Actor, SettingMode};

use crate::applicability::applies;
use crate::book::{Rule, RuleBook};
use crate::construction::{PoolConstruction, PoolField};
use crate::context::QueryContext;
use crate::replacement::resolve_chain;
use crate::status::{StatusKind, status_bonus};

/// Every applicable base rule of `mode` paired with the rule whose effects
/// it uses, in the actor's item order.
fn used_rules<'a>(
    book: &RuleBook<'a>,
    mode: SettingMode,
    ctx: &QueryContext<'_>,
) -> Vec<(Rule<'a>, Rule<'a>)> {
    book.rules(mode)
        .iter()
        .filter(|&&rule| applies(book, rule, ctx))
        .map(|&rule| (rule, resolve_chain(book, rule, ctx).used))
        .collect()
}

/// Call `f` with the effective rule of every applicable base rule of `mode`,
/// in the actor's item order.
pub(crate) fn for_each_used<'a>(
    book: &RuleBook<'a>,
    mode: SettingMode,
    ctx: &QueryContext<'_>,
    mut f: impl FnMut(Rule<'a>),
) {
    for (_, used) in used_rules(book, mode, ctx) {
        f(used);
    }
}

/// Apply every applicable rule of a pool kind to `construction`.
///
/// For each used rule, bonus sources are added first, then bonus stats are
/// prechecked, then bonus dice become a field keyed by the granting gift and
/// rule index. An `applied` dice field is checked when the base rule also
/// holds in an autocheck evaluation, even if a replacement supplies the
/// dice. Guard and aim kinds delegate to [`status_bonus`]; other non-pool
/// kinds leave the construction untouched.
pub fn aggregate(
    book: &RuleBook<'_>,
    mode: SettingMode,
    ctx: &QueryContext<'_>,
    mut construction: PoolConstruction,
) -> PoolConstruction {
    match mode {
        SettingMode::GuardBonus => {
            return status_bonus(book, StatusKind::Guard, ctx, false, construction);
        }
        SettingMode::AimBonus => {
            return status_bonus(book, StatusKind::Aim, ctx, false, construction);
        }
        m if !m.is_pool_kind() => {
            tracing::debug!(mode = %m, "not a pool kind, nothing to aggregate");
            return construction;
        }
        _ => {}
    }

    for (base, used) in used_rules(book, mode, ctx) {
        let Some(bonus) = used.setting.effect.dice_bonus() else {
            continue;
        };

        for source in bonus.sources() {
            construction = match source {
                BonusSource::Armor => armor_fields(book.actor(), true, construction),
                BonusSource::Shield => shield_field(book.actor(), construction),
                BonusSource::Guard => {
                    status_bonus(book, StatusKind::Guard, ctx, false, construction)
                }
                BonusSource::GuardAlways => {
                    status_bonus(book, StatusKind::Guard, ctx, true, construction)
                }
                BonusSource::Aim => status_bonus(book, StatusKind::Aim, ctx, false, construction),
                BonusSource::AimAlways => {
                    status_bonus(book, StatusKind::Aim, ctx, true, construction)
                }
            };
        }

        let stats = bonus
            .bonus_stats
            .as_ref()
            .map(|list| list.as_slice())
            .unwrap_or(used.gift.use_dice.stats.as_slice());
        for stat in stats {
            construction.precheck(stat);
        }

        let dice = bonus.bonus_dice.unwrap_or(used.gift.use_dice.dice);
        if !dice.is_empty() {
            let checked = match bonus.bonus_auto_used {
                AutoUse::Always => true,
                AutoUse::Never => false,
                AutoUse::Applied => applies(book, base, &ctx.autochecking()),
            };
            construction.insert_field(
                PoolField::new(
                    format!("{}-{}", used.item.id.0, used.index),
                    used.gift_name(),
                    dice,
                )
                .checked(checked)
                .from_source(used.item.id, bonus.bonus_exhausts_on_use),
            );
        }
    }
    construction
}

/// Add one field per worn armor piece, up to three.
pub fn armor_fields(
    actor: &Actor,
    checked: bool,
    mut construction: PoolConstruction,
) -> PoolConstruction {
    for (item, armor) in actor.worn_armor() {
        if armor.dice.is_empty() {
            continue;
        }
        construction.insert_field(
            PoolField::new(format!("armor-{}", item.id.0), &item.name, armor.dice).checked(checked),
        );
    }
    construction
}

/// Add the held shield's cover dice.
pub fn shield_field(actor: &Actor, mut construction: PoolConstruction) -> PoolConstruction {
    if let Some((item, shield)) = actor.held_shield().filter(|(_, s)| !s.dice.is_empty()) {
        construction.insert_field(PoolField::new("shield", &item.name, shield.dice));
    }
    construction
}
