//! Preset pool constructions for the standard rolls.

use ic_core::item::StatRoll;
use ic_core::{Item, SettingMode};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, armor_fields, shield_field};
use crate::book::RuleBook;
use crate::construction::{PoolConstruction, PoolField};
use crate::context::{DefenseKind, QueryContext};
use crate::status::{StatusKind, status_bonus};
use crate::transform::{change_stats, upgrade_dice};

/// Descriptor on an opposing attack that lets a shield cover resist rolls.
pub const EXPLOSIVE: &str = "explosive";

/// A roll an actor can make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Attack with the context item.
    Attack,
    /// Defend against an attack.
    Defense(DefenseKind),
    /// Counterattack with the context item.
    Counter,
    /// Resist an effect.
    Resist,
    /// Soak damage.
    Soak {
        /// Whether worn armor starts checked.
        autocheck_armor: bool,
    },
    /// Roll initiative.
    Initiative,
    /// Sprint.
    Sprint,
    /// A plain check with the given stats.
    Skill(Vec<String>),
    /// Roll the named gifts' dice.
    Gifts(Vec<String>),
}

impl Action {
    /// Short name used as the start of the roll label.
    pub fn title(&self, item: Option<&Item>) -> String {
        let base = match self {
            Self::Attack => "Attack",
            Self::Defense(DefenseKind::Dodge) => "Dodge",
            Self::Defense(DefenseKind::Parry) => "Parry",
            Self::Defense(DefenseKind::Special) => "Defense",
            Self::Counter => "Counter",
            Self::Resist => "Resist",
            Self::Soak { .. } => "Soak",
            Self::Initiative => "Initiative",
            Self::Sprint => "Sprint",
            Self::Skill(_) => "Check",
            Self::Gifts(_) => "Gifts",
        };
        match (self, item) {
            (Self::Attack | Self::Defense(DefenseKind::Parry) | Self::Counter, Some(item)) => {
                format!("{base} with {}", item.name)
            }
            _ => base.to_string(),
        }
    }
}

/// Build the pool construction for `action`.
///
/// Weapon rolls take the context item; without one only the bonuses apply.
pub fn prepare_action(
    book: &RuleBook<'_>,
    action: &Action,
    ctx: &QueryContext<'_>,
) -> PoolConstruction {
    let mut c = PoolConstruction::new();
    c.push_label(&action.title(ctx.item));
    let weapon = ctx.item.and_then(|i| i.as_weapon().map(|w| (i, w)));

    match action {
        Action::Attack => {
            c = status_bonus(book, StatusKind::Aim, ctx, false, c);
            if let Some((item, w)) = weapon {
                c = weapon_roll(book, ctx, item, &w.attack, c);
            }
            c = aggregate(book, SettingMode::AttackBonus, ctx, c);
        }
        Action::Defense(kind) => {
            let ctx = ctx.clone().with_defense(*kind);
            c = shield_field(book.actor(), c);
            c = status_bonus(book, StatusKind::Guard, &ctx, false, c);
            match (kind, weapon) {
                (DefenseKind::Dodge, _) => {
                    c.precheck("speed");
                    c.precheck("dodge");
                }
                (DefenseKind::Parry, Some((item, w))) => {
                    c = weapon_roll(book, &ctx, item, &w.defense, c);
                }
                _ => {}
            }
            c = aggregate(book, SettingMode::DefenseBonus, &ctx, c);
        }
        Action::Counter => {
            c = status_bonus(book, StatusKind::Guard, ctx, false, c);
            if let Some((item, w)) = weapon {
                c = weapon_roll(book, ctx, item, &w.counter, c);
            }
            c = aggregate(book, SettingMode::CounterBonus, ctx, c);
        }
        Action::Resist => {
            let explosive = ctx
                .other_item
                .is_some_and(|o| o.descriptors.contains(EXPLOSIVE));
            if explosive {
                c = shield_field(book.actor(), c);
            }
            c = aggregate(book, SettingMode::ResistBonus, ctx, c);
        }
        Action::Soak { autocheck_armor } => {
            c = armor_fields(book.actor(), *autocheck_armor, c);
            c.precheck("body");
            c = aggregate(book, SettingMode::SoakBonus, ctx, c);
        }
        Action::Initiative => {
            c.precheck("speed");
            c.precheck("mind");
            c = aggregate(book, SettingMode::InitiativeBonus, ctx, c);
        }
        Action::Sprint => {
            c.precheck("speed");
            c = aggregate(book, SettingMode::SprintBonus, ctx, c);
        }
        Action::Skill(stats) => {
            for stat in stats {
                c.precheck(stat);
            }
        }
        Action::Gifts(names) => {
            for name in names {
                c = gift_field(book, name, c);
            }
        }
    }
    c
}

/// Precheck a weapon roll's stats and add its dice, after stat change and
/// dice upgrade rules.
fn weapon_roll(
    book: &RuleBook<'_>,
    ctx: &QueryContext<'_>,
    item: &Item,
    roll: &StatRoll,
    mut c: PoolConstruction,
) -> PoolConstruction {
    let (stats, stat_labels) = change_stats(book, ctx, &roll.stats);
    for stat in &stats {
        c.precheck(stat);
    }
    let (dice, dice_labels) = upgrade_dice(book, ctx, roll.dice);
    if !dice.is_empty() {
        c.insert_field(PoolField::new(format!("weapon-{}", item.id.0), &item.name, dice));
    }
    for addition in stat_labels.iter().chain(&dice_labels) {
        c.push_label(addition);
    }
    c
}

fn gift_field(book: &RuleBook<'_>, name: &str, mut c: PoolConstruction) -> PoolConstruction {
    let Some((item, gift)) = book
        .actor()
        .item_named(name)
        .and_then(|i| i.as_gift().map(|g| (i, g)))
    else {
        tracing::warn!(gift = name, "no such gift");
        return c;
    };
    if !gift.is_refreshed() {
        tracing::debug!(gift = %item.name, "gift is exhausted");
        return c;
    }
    if gift.use_dice.dice.is_empty() {
        return c;
    }
    for stat in &gift.use_dice.stats {
        c.precheck(stat);
    }
    c.insert_field(
        PoolField::new(format!("gift-{}", item.id.0), &item.name, gift.use_dice.dice)
            .from_source(item.id, gift.exhaust_when_used),
    );
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OpposingItem;
    use crate::testing::actor;
    use ic_core::{Actor, Conditions, DiceArray, KeyList};
    use serde_json::json;

    fn fighter() -> Actor {
        actor(json!({
            "traits": [
                {"key": "body", "dice": "d8"},
                {"key": "speed", "dice": "d8"},
                {"key": "mind", "dice": "d6"}
            ],
            "skills": [{"key": "meleecombat", "marks": 3}, {"key": "dodge", "marks": 1}],
            "items": [
                {"name": "Longsword", "type": "weapon", "readied": true,
                 "descriptors": "sword", "attack": "body, meleecombat; d8",
                 "defense": "body, meleecombat", "counter": "speed, meleecombat; d6"},
                {"name": "Kite Shield", "type": "shield", "held": true, "dice": "d8"},
                {"name": "Weapon Master", "type": "gift", "useDice": "d6", "specialSettings": [
                    {"settingMode": "attackBonus", "descriptor": "sword"}
                ]},
                {"name": "Second Wind", "type": "gift", "useDice": "endurance; d8",
                 "exhaustWhenUsed": true}
            ]
        }))
    }

    #[test]
    fn attack_with_weapon() {
        let actor = fighter();
        let book = RuleBook::build(&actor);
        let none = Conditions::default();
        let sword = actor.item_named("Longsword").unwrap();
        let ctx = QueryContext::new(&none).with_item(sword);
        let c = prepare_action(&book, &Action::Attack, &ctx);
        assert_eq!(c.prechecked, vec!["body", "meleecombat"]);
        let names: Vec<_> = c.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Longsword", "Weapon Master"]);
        assert_eq!(c.label, "Attack with Longsword");
    }

    #[test]
    fn dodge_uses_shield_and_base_stats() {
        let actor = fighter();
        let book = RuleBook::build(&actor);
        let guarding = Conditions::with_active(["guarding"]);
        let ctx = QueryContext::new(&guarding);
        let c = prepare_action(&book, &Action::Defense(DefenseKind::Dodge), &ctx);
        assert_eq!(c.prechecked, vec!["speed", "dodge"]);
        let ids: Vec<_> = c.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["shield", "guard"]);
    }

    #[test]
    fn resist_takes_shield_only_against_explosions() {
        let actor = fighter();
        let book = RuleBook::build(&actor);
        let none = Conditions::default();
        let blast = OpposingItem {
            name: "Fireball".into(),
            descriptors: KeyList::parse("explosive, fire"),
            effects: KeyList::default(),
        };
        let plain = prepare_action(&book, &Action::Resist, &QueryContext::new(&none));
        assert!(plain.fields.is_empty());
        let ctx = QueryContext::new(&none).with_other_item(&blast);
        let covered = prepare_action(&book, &Action::Resist, &ctx);
        assert_eq!(covered.fields[0].id, "shield");
    }

    #[test]
    fn gifts_are_rolled_while_refreshed() {
        let mut actor = fighter();
        let c = {
            let book = RuleBook::build(&actor);
            let none = Conditions::default();
            prepare_action(
                &book,
                &Action::Gifts(vec!["Second Wind".into()]),
                &QueryContext::new(&none),
            )
        };
        assert_eq!(c.prechecked, vec!["endurance"]);
        assert_eq!(c.fields[0].dice, DiceArray::parse("d8"));
        assert!(c.fields[0].exhausts_on_use);

        let id = actor.item_named("Second Wind").unwrap().id;
        actor.set_gift_exhausted(id, true).unwrap();
        let book = RuleBook::build(&actor);
        let none = Conditions::default();
        let c = prepare_action(
            &book,
            &Action::Gifts(vec!["Second Wind".into()]),
            &QueryContext::new(&none),
        );
        assert!(c.fields.is_empty());
    }

    #[test]
    fn initiative_and_sprint_bases() {
        let actor = fighter();
        let book = RuleBook::build(&actor);
        let none = Conditions::default();
        let ctx = QueryContext::new(&none);
        assert_eq!(
            prepare_action(&book, &Action::Initiative, &ctx).prechecked,
            vec!["speed", "mind"]
        );
        assert_eq!(prepare_action(&book, &Action::Sprint, &ctx).prechecked, vec!["speed"]);
    }
}
