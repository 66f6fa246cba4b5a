//! Gift special settings: conditional bonus rules.
//!
//! A [`SpecialSetting`] is split into a [`SettingFilter`] stating when it
//! applies and a [`SettingEffect`] stating what it contributes. The effect is
//! tagged by `settingMode`, so each rule kind carries only its own payload.
//!
//! Reading a rule never fails. A scalar of the wrong type falls back to its
//! default with a warning; a rule that still cannot be read is kept, marked
//! [`SpecialSetting::unreadable`], and never applies.

pub mod schema;

pub use schema::{MatchFields, allowed_fields, problems, prototype};

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dice::DiceArray;
use crate::names::KeyList;

/// The kind of a special setting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SettingMode {
    /// Bonus to attack pools.
    AttackBonus,
    /// Bonus to defense pools.
    DefenseBonus,
    /// Bonus to counter-attack pools.
    CounterBonus,
    /// Bonus to resist pools.
    ResistBonus,
    /// Bonus to soak pools.
    SoakBonus,
    /// Bonus added while guarding.
    GuardBonus,
    /// Bonus added while aiming.
    AimBonus,
    /// Bonus to sprint pools.
    SprintBonus,
    /// Bonus to initiative pools.
    InitiativeBonus,
    /// Flat movement bonus.
    MoveBonus,
    /// Flat movement bonus while flying.
    FlyingBonus,
    /// Grants a reroll type.
    RerollBonus,
    /// Reduces range penalties.
    RangePenaltyReduction,
    /// Raises encumbrance limits.
    EncumbranceBonus,
    /// Overrides a currency's value.
    CurrencyValueChange,
    /// Swaps the stats an item rolls with.
    StatChange,
    /// Upgrades an item's dice.
    DiceUpgrade,
}

impl SettingMode {
    /// Returns true for kinds that add fields to a dice pool.
    pub fn is_pool_kind(self) -> bool {
        matches!(
            self,
            Self::AttackBonus
                | Self::DefenseBonus
                | Self::CounterBonus
                | Self::ResistBonus
                | Self::SoakBonus
                | Self::SprintBonus
                | Self::InitiativeBonus
        )
    }
}

/// Which exhaust state the granting gift must be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorksWhen {
    /// Works regardless of exhaustion.
    #[default]
    AnyState,
    /// Works only while the gift is refreshed.
    Refreshed,
    /// Works only while the gift is exhausted.
    Exhausted,
}

/// When a bonus dice field starts out checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoUse {
    /// Checked if the rule also applies in an autocheck evaluation.
    #[default]
    Applied,
    /// Always checked.
    Always,
    /// Never checked.
    Never,
}

/// Sub-builders a dice bonus can pull in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum BonusSource {
    /// Worn armor, up to three pieces.
    Armor,
    /// The held shield.
    Shield,
    /// Guard bonus while guarding.
    Guard,
    /// Guard bonus regardless of guarding.
    GuardAlways,
    /// Aim bonus while aiming.
    Aim,
    /// Aim bonus regardless of aiming.
    AimAlways,
}

/// Applicability fields. Empty lists are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingFilter {
    /// Item kinds.
    #[serde(rename = "type")]
    pub item_type: KeyList,
    /// Item names.
    pub name: KeyList,
    /// Gift tags.
    pub tag: KeyList,
    /// Weapon or gear descriptors.
    pub descriptor: KeyList,
    /// Weapon effects.
    pub effect: KeyList,
    /// Rolled stats.
    pub stat: KeyList,
    /// Weapon handedness.
    pub equip: KeyList,
    /// Weapon range bands.
    pub range: KeyList,
    /// Active status conditions.
    pub condition: KeyList,
    /// Opposing item descriptors.
    pub other_item: KeyList,
    /// Required exhaust state of the granting gift.
    #[serde(deserialize_with = "lenient")]
    pub works_when: WorksWhen,
    /// Requires a second readied weapon.
    #[serde(deserialize_with = "lenient_scalar")]
    pub needs_second_readied: bool,
    /// Applies to dodge defenses.
    pub applies_to_dodges: bool,
    /// Applies to parry defenses.
    pub applies_to_parries: bool,
    /// Applies to special defenses.
    pub applies_to_special_defenses: bool,
    /// Requires a one among the rolled dice.
    #[serde(deserialize_with = "lenient_scalar")]
    pub requires_one_in_roll: bool,
    /// Fields enforced only during autocheck evaluation.
    pub autocheck_only: KeyList,
}

impl Default for SettingFilter {
    fn default() -> Self {
        Self {
            item_type: KeyList::default(),
            name: KeyList::default(),
            tag: KeyList::default(),
            descriptor: KeyList::default(),
            effect: KeyList::default(),
            stat: KeyList::default(),
            equip: KeyList::default(),
            range: KeyList::default(),
            condition: KeyList::default(),
            other_item: KeyList::default(),
            works_when: WorksWhen::AnyState,
            needs_second_readied: false,
            applies_to_dodges: true,
            applies_to_parries: true,
            applies_to_special_defenses: true,
            requires_one_in_roll: false,
            autocheck_only: KeyList::default(),
        }
    }
}

/// Payload of the pool bonus kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiceBonus {
    /// Sub-builders to pull in (`armor`, `shield`, `guard-always`, ...).
    pub bonus_sources: KeyList,
    /// Stats to precheck; the gift's own stats when absent.
    pub bonus_stats: Option<KeyList>,
    /// Dice to add; the gift's own dice when absent.
    pub bonus_dice: Option<DiceArray>,
    /// Default checkbox state of the dice field.
    #[serde(deserialize_with = "lenient")]
    pub bonus_auto_used: AutoUse,
    /// Exhaust the gift when the dice field is used.
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_exhausts_on_use: bool,
}

impl DiceBonus {
    /// Bonus sources, skipping names that are not sources.
    pub fn sources(&self) -> Vec<BonusSource> {
        self.bonus_sources
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

/// Payload of the guard and aim kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusDice {
    /// Dice to add; the gift's own dice when absent.
    pub bonus_dice: Option<DiceArray>,
    /// Competes with the base bonus instead of adding to it.
    pub replaces_base_bonus: bool,
}

impl Default for StatusDice {
    fn default() -> Self {
        Self {
            bonus_dice: None,
            replaces_base_bonus: true,
        }
    }
}

/// Payload of the movement kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveBonus {
    /// Added to stride.
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_stride: i32,
    /// Added to dash.
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_dash: i32,
    /// Added to run.
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_run: i32,
    /// Lets the actor ignore bad footing.
    #[serde(deserialize_with = "lenient_scalar")]
    pub ignore_bad_footing: bool,
}

/// Payload of the reroll kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RerollBonus {
    /// The reroll type granted.
    pub reroll_type: String,
    /// Exhaust the gift when the reroll is used.
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_exhausts_on_use: bool,
    /// Alternative identifier shown for the reroll.
    pub identifier_override: Option<String>,
}

/// Payload of the range penalty reduction kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeReduction {
    /// Range bands of penalty removed.
    #[serde(deserialize_with = "lenient_scalar")]
    pub penalty_reduction: u32,
}

/// Payload of the encumbrance kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncumbranceBonus {
    /// Added to the encumbrance limits (doubled and tripled for the higher
    /// limits).
    #[serde(deserialize_with = "lenient_scalar")]
    pub encumbrance_bonus: f64,
}

/// Payload of the currency value kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencyChange {
    /// Compare-ready currency key.
    pub currency_name: String,
    /// New value, a number or fraction such as `"1/12"`.
    #[serde(deserialize_with = "number_as_text")]
    pub currency_value: String,
}

/// Payload of the stat change kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatChange {
    /// Stats to replace.
    pub change_from: KeyList,
    /// Replacement stats, index aligned with `change_from`.
    pub change_to: KeyList,
    /// Appended to the roll label.
    pub name_addition: String,
}

/// Payload of the dice upgrade kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiceUpgrade {
    /// Die sizes to step up.
    #[serde(deserialize_with = "lenient_scalar")]
    pub upgrade_steps: u32,
    /// Appended to the roll label.
    pub name_addition: String,
}

/// What a rule contributes, one variant per [`SettingMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "settingMode", rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum SettingEffect {
    AttackBonus(DiceBonus),
    DefenseBonus(DiceBonus),
    CounterBonus(DiceBonus),
    ResistBonus(DiceBonus),
    SoakBonus(DiceBonus),
    GuardBonus(StatusDice),
    AimBonus(StatusDice),
    SprintBonus(DiceBonus),
    InitiativeBonus(DiceBonus),
    MoveBonus(MoveBonus),
    FlyingBonus(MoveBonus),
    RerollBonus(RerollBonus),
    RangePenaltyReduction(RangeReduction),
    EncumbranceBonus(EncumbranceBonus),
    CurrencyValueChange(CurrencyChange),
    StatChange(StatChange),
    DiceUpgrade(DiceUpgrade),
    /// A `settingMode` this engine does not know.
    #[serde(skip_deserializing)]
    Unrecognized {
        /// The mode as written.
        mode_name: String,
    },
}

impl SettingEffect {
    /// The kind of this effect, or `None` for an unrecognized mode.
    pub fn mode(&self) -> Option<SettingMode> {
        Some(match self {
            Self::AttackBonus(_) => SettingMode::AttackBonus,
            Self::DefenseBonus(_) => SettingMode::DefenseBonus,
            Self::CounterBonus(_) => SettingMode::CounterBonus,
            Self::ResistBonus(_) => SettingMode::ResistBonus,
            Self::SoakBonus(_) => SettingMode::SoakBonus,
            Self::GuardBonus(_) => SettingMode::GuardBonus,
            Self::AimBonus(_) => SettingMode::AimBonus,
            Self::SprintBonus(_) => SettingMode::SprintBonus,
            Self::InitiativeBonus(_) => SettingMode::InitiativeBonus,
            Self::MoveBonus(_) => SettingMode::MoveBonus,
            Self::FlyingBonus(_) => SettingMode::FlyingBonus,
            Self::RerollBonus(_) => SettingMode::RerollBonus,
            Self::RangePenaltyReduction(_) => SettingMode::RangePenaltyReduction,
            Self::EncumbranceBonus(_) => SettingMode::EncumbranceBonus,
            Self::CurrencyValueChange(_) => SettingMode::CurrencyValueChange,
            Self::StatChange(_) => SettingMode::StatChange,
            Self::DiceUpgrade(_) => SettingMode::DiceUpgrade,
            Self::Unrecognized { .. } => return None,
        })
    }

    /// Dice bonus payload for the pool kinds.
    pub fn dice_bonus(&self) -> Option<&DiceBonus> {
        match self {
            Self::AttackBonus(b)
            | Self::DefenseBonus(b)
            | Self::CounterBonus(b)
            | Self::ResistBonus(b)
            | Self::SoakBonus(b)
            | Self::SprintBonus(b)
            | Self::InitiativeBonus(b) => Some(b),
            _ => None,
        }
    }

    /// Status dice payload for the guard and aim kinds.
    pub fn status_dice(&self) -> Option<&StatusDice> {
        match self {
            Self::GuardBonus(s) | Self::AimBonus(s) => Some(s),
            _ => None,
        }
    }
}

/// One conditional bonus rule owned by a gift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialSetting {
    /// What the rule contributes.
    #[serde(flatten)]
    pub effect: SettingEffect,
    /// When the rule applies.
    #[serde(flatten)]
    pub filter: SettingFilter,
    /// Name of a gift whose same-kind rule this one supersedes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_name: Option<String>,
    /// Why the rule could not be read. Such a rule never applies.
    #[serde(skip)]
    pub unreadable: Option<String>,
}

/// The strict wire shape of a rule.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSetting {
    #[serde(flatten)]
    effect: SettingEffect,
    #[serde(flatten)]
    filter: SettingFilter,
    #[serde(default)]
    replace_name: Option<String>,
}

impl SpecialSetting {
    /// Create a rule with the given effect and a wildcard filter.
    pub fn new(effect: SettingEffect) -> Self {
        Self {
            effect,
            filter: SettingFilter::default(),
            replace_name: None,
            unreadable: None,
        }
    }

    /// Read a rule from JSON.
    ///
    /// When the rule as a whole cannot be read it keeps whatever is still
    /// recognizable (mode, filter, replacement name) and records the reason
    /// in [`unreadable`](Self::unreadable).
    pub fn from_value(value: &Value) -> Self {
        let reason = match WireSetting::deserialize(value) {
            Ok(wire) => {
                return Self {
                    effect: wire.effect,
                    filter: wire.filter,
                    replace_name: wire.replace_name,
                    unreadable: None,
                };
            }
            Err(err) => err.to_string(),
        };
        let name = value
            .get("settingMode")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let effect = match name.parse::<SettingMode>() {
            Ok(mode) => prototype(mode).effect,
            Err(_) => SettingEffect::Unrecognized {
                mode_name: name.to_string(),
            },
        };
        Self {
            effect,
            filter: SettingFilter::deserialize(value).unwrap_or_default(),
            replace_name: value
                .get("replaceName")
                .and_then(Value::as_str)
                .map(String::from),
            unreadable: Some(reason),
        }
    }

    /// The kind of this rule, or `None` for an unrecognized mode.
    pub fn mode(&self) -> Option<SettingMode> {
        self.effect.mode()
    }
}

impl<'de> Deserialize<'de> for SpecialSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn degraded<T: Default>(value: &Value, err: &serde_json::Error) -> T {
    tracing::warn!(%value, %err, "unreadable setting value, using the default");
    T::default()
}

/// A field that falls back to its default when it has the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(&value).unwrap_or_else(|err| degraded(&value, &err)))
}

/// Like [`lenient`], also reading numbers and flags written as strings.
fn lenient_scalar<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default + FromStr,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(parsed) = value.as_str().and_then(|s| s.trim().parse().ok()) {
        return Ok(parsed);
    }
    Ok(T::deserialize(&value).unwrap_or_else(|err| degraded(&value, &err)))
}

fn number_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(n) => n.to_string(),
        other => {
            let err = <serde_json::Error as serde::de::Error>::custom("expected a number or text");
            degraded(&other, &err)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_attack_bonus() {
        let setting: SpecialSetting = serde_json::from_str(
            r#"{
                "settingMode": "attackBonus",
                "descriptor": "slashing, sword",
                "condition": "Aiming",
                "bonusDice": "d6",
                "bonusAutoUsed": "always",
                "replaceName": "Sword Master"
            }"#,
        )
        .unwrap();
        assert_eq!(setting.mode(), Some(SettingMode::AttackBonus));
        assert_eq!(setting.filter.descriptor, KeyList::parse("slashing, sword"));
        assert!(setting.filter.condition.contains("aiming"));
        assert!(setting.filter.applies_to_dodges);
        let bonus = setting.effect.dice_bonus().unwrap();
        assert_eq!(bonus.bonus_dice, Some(DiceArray::parse("d6")));
        assert_eq!(bonus.bonus_auto_used, AutoUse::Always);
        assert_eq!(bonus.bonus_stats, None);
        assert_eq!(setting.replace_name.as_deref(), Some("Sword Master"));
    }

    #[test]
    fn deserialize_guard_bonus_defaults_to_replacing() {
        let setting: SpecialSetting =
            serde_json::from_str(r#"{"settingMode": "guardBonus", "bonusDice": "d12"}"#).unwrap();
        let status = setting.effect.status_dice().unwrap();
        assert!(status.replaces_base_bonus);
    }

    #[test]
    fn wrong_scalar_types_degrade_to_defaults() {
        let setting: SpecialSetting = serde_json::from_str(
            r#"{"settingMode": "moveBonus", "bonusStride": "2", "bonusDash": "two",
                "ignoreBadFooting": 1}"#,
        )
        .unwrap();
        assert_eq!(setting.unreadable, None);
        let SettingEffect::MoveBonus(bonus) = &setting.effect else {
            panic!("expected a move bonus");
        };
        assert_eq!(bonus.bonus_stride, 2);
        assert_eq!(bonus.bonus_dash, 0);
        assert!(!bonus.ignore_bad_footing);

        let change: SpecialSetting = serde_json::from_str(
            r#"{"settingMode": "currencyValueChange", "currencyName": "denar", "currencyValue": 2}"#,
        )
        .unwrap();
        let SettingEffect::CurrencyValueChange(change) = &change.effect else {
            panic!("expected a currency change");
        };
        assert_eq!(change.currency_value, "2");
    }

    #[test]
    fn unknown_mode_is_kept_as_unreadable() {
        let setting: SpecialSetting =
            serde_json::from_str(r#"{"settingMode": "somethingNew", "condition": "flying"}"#)
                .unwrap();
        assert_eq!(setting.mode(), None);
        assert_eq!(
            setting.effect,
            SettingEffect::Unrecognized {
                mode_name: "somethingNew".into()
            }
        );
        assert!(setting.unreadable.is_some());
        assert!(setting.filter.condition.contains("flying"));
    }

    #[test]
    fn unreadable_rule_keeps_its_mode() {
        let setting: SpecialSetting = serde_json::from_str(
            r#"{"settingMode": "attackBonus", "descriptor": {"odd": true}, "replaceName": "Rival"}"#,
        )
        .unwrap();
        assert_eq!(setting.mode(), Some(SettingMode::AttackBonus));
        assert!(setting.unreadable.is_some());
        assert_eq!(setting.filter, SettingFilter::default());
        assert_eq!(setting.replace_name.as_deref(), Some("Rival"));
    }

    #[test]
    fn bonus_sources_parse() {
        let bonus = DiceBonus {
            bonus_sources: KeyList::parse("armor, guard-always, nonsense"),
            ..DiceBonus::default()
        };
        assert_eq!(
            bonus.sources(),
            vec![BonusSource::Armor, BonusSource::GuardAlways]
        );
    }

    #[test]
    fn mode_names() {
        assert_eq!(SettingMode::RangePenaltyReduction.to_string(), "rangePenaltyReduction");
        assert_eq!(
            "currencyValueChange".parse::<SettingMode>().unwrap(),
            SettingMode::CurrencyValueChange
        );
        assert!(SettingMode::SoakBonus.is_pool_kind());
        assert!(!SettingMode::GuardBonus.is_pool_kind());
    }
}
