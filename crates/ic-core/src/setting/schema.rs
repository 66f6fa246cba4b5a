//! Per-kind field templates for special settings.
//!
//! Each [`SettingMode`] only understands a subset of the applicability
//! fields. [`problems`] reports anything a rule sets outside that subset, or
//! values no subject could ever carry, so the engine can treat the rule as
//! malformed instead of guessing.

use bitflags::bitflags;

use super::{
    BonusSource, CurrencyChange, DiceBonus, DiceUpgrade, EncumbranceBonus, MoveBonus,
    RangeReduction, RerollBonus, SettingEffect, SettingFilter, SettingMode, SpecialSetting,
    StatChange, StatusDice,
};
use crate::item::{Equip, RangeBand};

bitflags! {
    /// A set of applicability fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFields: u16 {
        /// Item kind.
        const TYPE = 1;
        /// Item name.
        const NAME = 1 << 1;
        /// Gift tag.
        const TAG = 1 << 2;
        /// Descriptor.
        const DESCRIPTOR = 1 << 3;
        /// Weapon effect.
        const EFFECT = 1 << 4;
        /// Rolled stat.
        const STAT = 1 << 5;
        /// Handedness.
        const EQUIP = 1 << 6;
        /// Range band.
        const RANGE = 1 << 7;
        /// Status condition.
        const CONDITION = 1 << 8;
        /// Opposing item descriptor.
        const OTHER_ITEM = 1 << 9;
        /// Second readied weapon.
        const SECOND_READIED = 1 << 10;
        /// Defense subtype flags.
        const DEFENSE = 1 << 11;
        /// A one in the roll.
        const ONE_IN_ROLL = 1 << 12;

        /// Fields describing the acting item.
        const ITEM = Self::NAME.bits()
            | Self::TAG.bits()
            | Self::DESCRIPTOR.bits()
            | Self::EFFECT.bits()
            | Self::STAT.bits()
            | Self::EQUIP.bits()
            | Self::RANGE.bits();
        /// Fields describing the actor's situation.
        const SITUATION = Self::CONDITION.bits() | Self::OTHER_ITEM.bits();
    }
}

impl MatchFields {
    /// Look up a field by its compare-ready name.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "type" => Self::TYPE,
            "name" => Self::NAME,
            "tag" => Self::TAG,
            "descriptor" => Self::DESCRIPTOR,
            "effect" => Self::EFFECT,
            "stat" => Self::STAT,
            "equip" => Self::EQUIP,
            "range" => Self::RANGE,
            "condition" => Self::CONDITION,
            "otheritem" => Self::OTHER_ITEM,
            "secondreadied" => Self::SECOND_READIED,
            "defense" => Self::DEFENSE,
            "oneinroll" => Self::ONE_IN_ROLL,
            _ => return None,
        })
    }

    /// Fields named in a key list, ignoring unknown names.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        keys.into_iter()
            .filter_map(Self::from_key)
            .fold(Self::empty(), |acc, f| acc | f)
    }
}

/// The applicability fields a rule kind understands.
pub fn allowed_fields(mode: SettingMode) -> MatchFields {
    let weapon = MatchFields::ITEM | MatchFields::SITUATION | MatchFields::SECOND_READIED;
    match mode {
        SettingMode::AttackBonus
        | SettingMode::CounterBonus
        | SettingMode::ResistBonus
        | SettingMode::AimBonus
        | SettingMode::RangePenaltyReduction => weapon,
        SettingMode::DefenseBonus => weapon | MatchFields::DEFENSE,
        SettingMode::SoakBonus
        | SettingMode::GuardBonus
        | SettingMode::SprintBonus
        | SettingMode::InitiativeBonus
        | SettingMode::MoveBonus
        | SettingMode::FlyingBonus
        | SettingMode::EncumbranceBonus
        | SettingMode::CurrencyValueChange => MatchFields::SITUATION,
        SettingMode::RerollBonus => {
            MatchFields::STAT | MatchFields::SITUATION | MatchFields::ONE_IN_ROLL
        }
        SettingMode::StatChange | SettingMode::DiceUpgrade => {
            MatchFields::TYPE | MatchFields::ITEM | MatchFields::OTHER_ITEM
        }
    }
}

/// An empty rule of the given kind, with every field at its default.
pub fn prototype(mode: SettingMode) -> SpecialSetting {
    let effect = match mode {
        SettingMode::AttackBonus => SettingEffect::AttackBonus(DiceBonus::default()),
        SettingMode::DefenseBonus => SettingEffect::DefenseBonus(DiceBonus::default()),
        SettingMode::CounterBonus => SettingEffect::CounterBonus(DiceBonus::default()),
        SettingMode::ResistBonus => SettingEffect::ResistBonus(DiceBonus::default()),
        SettingMode::SoakBonus => SettingEffect::SoakBonus(DiceBonus::default()),
        SettingMode::GuardBonus => SettingEffect::GuardBonus(StatusDice::default()),
        SettingMode::AimBonus => SettingEffect::AimBonus(StatusDice::default()),
        SettingMode::SprintBonus => SettingEffect::SprintBonus(DiceBonus::default()),
        SettingMode::InitiativeBonus => SettingEffect::InitiativeBonus(DiceBonus::default()),
        SettingMode::MoveBonus => SettingEffect::MoveBonus(MoveBonus::default()),
        SettingMode::FlyingBonus => SettingEffect::FlyingBonus(MoveBonus::default()),
        SettingMode::RerollBonus => SettingEffect::RerollBonus(RerollBonus::default()),
        SettingMode::RangePenaltyReduction => {
            SettingEffect::RangePenaltyReduction(RangeReduction::default())
        }
        SettingMode::EncumbranceBonus => {
            SettingEffect::EncumbranceBonus(EncumbranceBonus::default())
        }
        SettingMode::CurrencyValueChange => {
            SettingEffect::CurrencyValueChange(CurrencyChange::default())
        }
        SettingMode::StatChange => SettingEffect::StatChange(StatChange::default()),
        SettingMode::DiceUpgrade => SettingEffect::DiceUpgrade(DiceUpgrade::default()),
    };
    SpecialSetting::new(effect)
}

/// Applicability fields a filter actually sets.
pub fn present_fields(filter: &SettingFilter) -> MatchFields {
    let lists = [
        (&filter.item_type, MatchFields::TYPE),
        (&filter.name, MatchFields::NAME),
        (&filter.tag, MatchFields::TAG),
        (&filter.descriptor, MatchFields::DESCRIPTOR),
        (&filter.effect, MatchFields::EFFECT),
        (&filter.stat, MatchFields::STAT),
        (&filter.equip, MatchFields::EQUIP),
        (&filter.range, MatchFields::RANGE),
        (&filter.condition, MatchFields::CONDITION),
        (&filter.other_item, MatchFields::OTHER_ITEM),
    ];
    let mut present = lists
        .into_iter()
        .filter(|(list, _)| !list.is_empty())
        .fold(MatchFields::empty(), |acc, (_, f)| acc | f);
    if filter.needs_second_readied {
        present |= MatchFields::SECOND_READIED;
    }
    if !(filter.applies_to_dodges
        && filter.applies_to_parries
        && filter.applies_to_special_defenses)
    {
        present |= MatchFields::DEFENSE;
    }
    if filter.requires_one_in_roll {
        present |= MatchFields::ONE_IN_ROLL;
    }
    present
}

/// Everything wrong with a rule. An empty list means the rule is usable.
pub fn problems(setting: &SpecialSetting) -> Vec<String> {
    let Some(mode) = setting.mode() else {
        let written = match &setting.effect {
            SettingEffect::Unrecognized { mode_name } => mode_name.as_str(),
            _ => "",
        };
        return vec![format!("unknown setting mode '{written}'")];
    };
    let filter = &setting.filter;
    let allowed = allowed_fields(mode);
    let mut found = Vec::new();
    if let Some(reason) = &setting.unreadable {
        found.push(format!("unreadable rule: {reason}"));
    }

    let stray = present_fields(filter) - allowed;
    for (name, _) in stray.iter_names() {
        found.push(format!("{mode} does not support the {} field", name.to_lowercase()));
    }

    for key in filter.autocheck_only.iter() {
        match MatchFields::from_key(key) {
            Some(field) if allowed.contains(field) => {}
            Some(_) => found.push(format!("{mode} cannot autocheck the {key} field")),
            None => found.push(format!("unknown autocheck field '{key}'")),
        }
    }
    for equip in filter.equip.iter() {
        if !matches!(equip.parse::<Equip>(), Ok(e) if e != Equip::Unknown) {
            found.push(format!("unknown equip slot '{equip}'"));
        }
    }
    for band in filter.range.iter() {
        if !matches!(band.parse::<RangeBand>(), Ok(b) if b != RangeBand::Unknown) {
            found.push(format!("unknown range band '{band}'"));
        }
    }

    match &setting.effect {
        SettingEffect::StatChange(change) => {
            if change.change_from.len() != change.change_to.len() {
                found.push(format!(
                    "stat change lists differ in length ({} vs {})",
                    change.change_from.len(),
                    change.change_to.len()
                ));
            }
        }
        SettingEffect::RerollBonus(reroll) if reroll.reroll_type.trim().is_empty() => {
            found.push("reroll bonus without a reroll type".into());
        }
        SettingEffect::CurrencyValueChange(change) if change.currency_name.trim().is_empty() => {
            found.push("currency change without a currency name".into());
        }
        effect => {
            if let Some(bonus) = effect.dice_bonus() {
                for source in bonus.bonus_sources.iter() {
                    if source.parse::<BonusSource>().is_err() {
                        found.push(format!("unknown bonus source '{source}'"));
                    }
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::KeyList;
    use strum::IntoEnumIterator;

    #[test]
    fn every_prototype_is_clean() {
        for mode in SettingMode::iter() {
            let proto = prototype(mode);
            assert_eq!(proto.mode(), Some(mode));
            if mode != SettingMode::RerollBonus && mode != SettingMode::CurrencyValueChange {
                assert!(problems(&proto).is_empty(), "{mode}: {:?}", problems(&proto));
            }
        }
    }

    #[test]
    fn stray_field_is_reported() {
        let mut setting = prototype(SettingMode::MoveBonus);
        setting.filter.descriptor = KeyList::parse("sword");
        let found = problems(&setting);
        assert_eq!(found, vec!["moveBonus does not support the descriptor field"]);
    }

    #[test]
    fn bad_values_are_reported() {
        let mut setting = prototype(SettingMode::AttackBonus);
        setting.filter.range = KeyList::parse("close, nowhere");
        setting.filter.equip = KeyList::parse("goodhand, tail");
        let found = problems(&setting);
        assert!(found.contains(&"unknown range band 'nowhere'".to_string()));
        assert!(found.contains(&"unknown equip slot 'tail'".to_string()));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn defense_flags_only_on_defense() {
        let mut setting = prototype(SettingMode::AttackBonus);
        setting.filter.applies_to_dodges = false;
        assert_eq!(problems(&setting).len(), 1);

        let mut setting = prototype(SettingMode::DefenseBonus);
        setting.filter.applies_to_dodges = false;
        assert!(problems(&setting).is_empty());
    }

    #[test]
    fn mismatched_stat_change() {
        let setting = SpecialSetting::new(SettingEffect::StatChange(StatChange {
            change_from: KeyList::parse("body, speed"),
            change_to: KeyList::parse("mind"),
            name_addition: String::new(),
        }));
        assert_eq!(problems(&setting).len(), 1);
    }

    #[test]
    fn autocheck_only_fields() {
        let mut setting = prototype(SettingMode::SoakBonus);
        setting.filter.autocheck_only = KeyList::parse("condition");
        assert!(problems(&setting).is_empty());
        setting.filter.autocheck_only = KeyList::parse("range, whatever");
        assert_eq!(problems(&setting).len(), 2);
    }

    #[test]
    fn unreadable_rules_are_reported() {
        let unknown = SpecialSetting::from_value(&serde_json::json!({"settingMode": "teleport"}));
        assert_eq!(problems(&unknown), vec!["unknown setting mode 'teleport'"]);

        let broken = SpecialSetting::from_value(&serde_json::json!({
            "settingMode": "soakBonus",
            "condition": 7
        }));
        let found = problems(&broken);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("unreadable rule: "));
    }

    #[test]
    fn match_fields_from_keys() {
        let fields = MatchFields::from_keys(["condition", "otheritem", "bogus"]);
        assert_eq!(fields, MatchFields::SITUATION);
    }
}
