//! Guard and aim bonuses, consolidated into a single pool field.

use std::cmp::Ordering;

use ic_core::condition::names;
use ic_core::{DiceArray, Die, SettingMode};

use crate::applicability::applies;
use crate::book::RuleBook;
use crate::construction::{PoolConstruction, PoolField};
use crate::context::QueryContext;
use crate::replacement::resolve_chain;

/// A status-linked bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Bonus while guarding.
    Guard,
    /// Bonus while aiming.
    Aim,
}

impl StatusKind {
    /// Rule kind feeding this bonus.
    pub fn mode(self) -> SettingMode {
        match self {
            Self::Guard => SettingMode::GuardBonus,
            Self::Aim => SettingMode::AimBonus,
        }
    }

    /// Condition that switches the bonus on.
    pub fn condition(self) -> &'static str {
        match self {
            Self::Guard => names::GUARDING,
            Self::Aim => names::AIMING,
        }
    }

    /// Pool field ID.
    pub fn field_id(self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Aim => "aim",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Guard => "Guarding",
            Self::Aim => "Aiming",
        }
    }
}

/// Add the guard or aim field to `construction`.
///
/// Does nothing unless the matching condition is active or `force` is set.
/// The base bonus is one d8; an applicable replacing rule with strictly
/// larger dice takes its place (first found wins ties), then additive rules
/// are summed on top.
pub fn status_bonus(
    book: &RuleBook<'_>,
    kind: StatusKind,
    ctx: &QueryContext<'_>,
    force: bool,
    mut construction: PoolConstruction,
) -> PoolConstruction {
    if !force && !ctx.conditions.has_any(&[kind.condition()]) {
        return construction;
    }

    let mut best = DiceArray::of(1, Die::D8);
    let mut label = kind.label().to_string();
    let mut additive = DiceArray::EMPTY;

    for &rule in book.rules(kind.mode()) {
        if !applies(book, rule, ctx) {
            continue;
        }
        let used = resolve_chain(book, rule, ctx).used;
        let Some(status) = used.setting.effect.status_dice() else {
            continue;
        };
        let dice = status.bonus_dice.unwrap_or(used.gift.use_dice.dice);
        if dice.is_empty() {
            continue;
        }
        if status.replaces_base_bonus {
            if dice.compare(&best) == Ordering::Greater {
                best = dice;
                label = format!("{} {}", used.gift_name(), kind.label());
            }
        } else {
            additive += dice;
        }
    }

    construction.insert_field(PoolField::new(kind.field_id(), label, best + additive));
    construction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::actor;
    use ic_core::Conditions;
    use serde_json::json;

    #[test]
    fn inactive_without_condition() {
        let actor = actor(json!({}));
        let book = RuleBook::build(&actor);
        let none = Conditions::default();
        let ctx = QueryContext::new(&none);
        let result = status_bonus(&book, StatusKind::Guard, &ctx, false, PoolConstruction::new());
        assert!(result.fields.is_empty());

        let forced = status_bonus(&book, StatusKind::Guard, &ctx, true, PoolConstruction::new());
        let field = forced.field("guard").unwrap();
        assert_eq!(field.dice, DiceArray::parse("d8"));
        assert_eq!(field.name, "Guarding");
        assert!(field.checked);
    }

    #[test]
    fn larger_replacement_wins_and_names_the_gift() {
        let actor = actor(json!({"items": [
            {"name": "Steady Guard", "type": "gift", "specialSettings": [
                {"settingMode": "guardBonus", "bonusDice": "d8"}
            ]},
            {"name": "Iron Guard", "type": "gift", "specialSettings": [
                {"settingMode": "guardBonus", "bonusDice": "d12"}
            ]}
        ]}));
        let book = RuleBook::build(&actor);
        let guarding = Conditions::with_active(["guarding"]);
        let ctx = QueryContext::new(&guarding);
        let result = status_bonus(&book, StatusKind::Guard, &ctx, false, PoolConstruction::new());
        assert_eq!(result.fields.len(), 1);
        let field = result.field("guard").unwrap();
        assert_eq!(field.dice, DiceArray::parse("d12"));
        assert_eq!(field.name, "Iron Guard Guarding");
    }

    #[test]
    fn ties_keep_first_and_additives_stack() {
        let actor = actor(json!({"items": [
            {"name": "First", "type": "gift", "specialSettings": [
                {"settingMode": "aimBonus", "bonusDice": "d10"}
            ]},
            {"name": "Second", "type": "gift", "specialSettings": [
                {"settingMode": "aimBonus", "bonusDice": "d10"}
            ]},
            {"name": "Extra", "type": "gift", "useDice": "d4", "specialSettings": [
                {"settingMode": "aimBonus", "replacesBaseBonus": false}
            ]}
        ]}));
        let book = RuleBook::build(&actor);
        let aiming = Conditions::with_active(["aiming"]);
        let ctx = QueryContext::new(&aiming);
        let result = status_bonus(&book, StatusKind::Aim, &ctx, false, PoolConstruction::new());
        let field = result.field("aim").unwrap();
        assert_eq!(field.name, "First Aiming");
        assert_eq!(field.dice, DiceArray::parse("d10, d4"));
    }
}
