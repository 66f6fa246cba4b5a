//! Items carried by an actor: gifts, weapons, armor, shields, extra careers
//! and general gear.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dice::DiceArray;
use crate::names::{KeyList, make_compare_ready, split_stat_string};
use crate::setting::SpecialSetting;

/// Unique identifier for an item on an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// How a weapon is held.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Equip {
    /// Wielded in the good hand.
    GoodHand,
    /// Wielded in the off hand.
    OffHand,
    /// Wielded with both hands.
    TwoHands,
    /// Anything else (natural weapons, mounted gear).
    Other,
    /// A slot this engine does not know; matches no equip filter.
    #[serde(other)]
    Unknown,
}

impl Equip {
    /// Filter key of the slot, or `None` for an unknown slot.
    pub fn key(self) -> Option<String> {
        (self != Self::Unknown).then(|| self.to_string())
    }
}

/// Range bands, nearest first.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RangeBand {
    /// Touching distance.
    Close,
    /// Polearm distance.
    Reach,
    /// A few paces.
    Near,
    /// About a dozen paces.
    Short,
    /// Medium range.
    Medium,
    /// Long range.
    Long,
    /// Very long range.
    VeryLong,
    /// Extreme range.
    Extreme,
    /// Far range.
    Far,
    /// To the horizon.
    Horizon,
    /// A band this engine does not know; matches no range filter.
    #[serde(other)]
    Unknown,
}

impl RangeBand {
    /// Distance in paces the band reaches to.
    pub fn paces(self) -> u32 {
        match self {
            Self::Close => 1,
            Self::Reach => 2,
            Self::Near => 4,
            Self::Short => 12,
            Self::Medium => 36,
            Self::Long => 100,
            Self::VeryLong => 300,
            Self::Extreme => 1000,
            Self::Far => 3000,
            Self::Horizon => 11000,
            Self::Unknown => 0,
        }
    }

    /// Filter key of the band, or `None` for an unknown band.
    pub fn key(self) -> Option<String> {
        (self != Self::Unknown).then(|| self.to_string())
    }
}

/// A stat-and-dice roll written as `"stat, stat; dice"`.
///
/// Without a `;` the text is read as dice if its first term parses as a die,
/// otherwise as a stat list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StatRoll {
    /// Compare-ready stat names.
    pub stats: Vec<String>,
    /// Flat dice added to the roll.
    pub dice: DiceArray,
}

impl StatRoll {
    /// Parse a roll description.
    pub fn parse(text: &str) -> Self {
        if let Some((stats, dice)) = text.split_once(';') {
            return Self {
                stats: split_stat_string(stats),
                dice: DiceArray::parse(dice),
            };
        }
        let first = text.split(',').next().unwrap_or_default();
        if DiceArray::parse_single(first).is_some() {
            Self {
                stats: Vec::new(),
                dice: DiceArray::parse(text),
            }
        } else {
            Self {
                stats: split_stat_string(text),
                dice: DiceArray::EMPTY,
            }
        }
    }

    /// Returns true if the roll has neither stats nor dice.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty() && self.dice.is_empty()
    }
}

impl From<String> for StatRoll {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<StatRoll> for String {
    fn from(roll: StatRoll) -> Self {
        let stats = roll.stats.join(", ");
        match (stats.is_empty(), roll.dice.is_empty()) {
            (_, true) => stats,
            (true, false) => roll.dice.format(true),
            (false, false) => format!("{stats}; {}", roll.dice),
        }
    }
}

/// A gift: a character ability granting special settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gift {
    /// Gift tags.
    pub tags: KeyList,
    /// Stats and dice the gift adds when used.
    pub use_dice: StatRoll,
    /// Whether using the gift exhausts it.
    pub exhaust_when_used: bool,
    /// Current exhaust flag.
    pub exhausted: bool,
    /// A skill this gift grants one mark in.
    pub grants_mark: Option<String>,
    /// Conditional bonus rules, in authoring order.
    pub special_settings: Vec<SpecialSetting>,
}

impl Gift {
    /// Whether the gift counts as refreshed. Gifts that never exhaust are
    /// always refreshed.
    pub fn is_refreshed(&self) -> bool {
        !self.exhaust_when_used || !self.exhausted
    }
}

/// A weapon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Weapon {
    /// Whether the weapon is readied.
    pub readied: bool,
    /// Weapon descriptors (slashing, magic, wand).
    pub descriptors: KeyList,
    /// Weapon effects (damage, impaling).
    pub effects: KeyList,
    /// Handedness.
    pub equip: Option<Equip>,
    /// Range band.
    pub range: Option<RangeBand>,
    /// Attack roll.
    pub attack: StatRoll,
    /// Parry roll.
    pub defense: StatRoll,
    /// Counter roll.
    pub counter: StatRoll,
}

/// A piece of armor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Armor {
    /// Whether the armor is worn.
    pub worn: bool,
    /// Soak dice.
    pub dice: DiceArray,
}

/// A shield.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shield {
    /// Whether the shield is held.
    pub held: bool,
    /// Cover dice.
    pub dice: DiceArray,
}

/// An extra career beyond the actor's main one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtraCareer {
    /// Career dice.
    pub dice: DiceArray,
    /// The career's skills.
    pub skills: KeyList,
}

/// Generic equipment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gear {
    /// Whether the gear is readied.
    pub readied: bool,
    /// Gear descriptors (wand, light source).
    pub descriptors: KeyList,
}

/// Kind-specific item data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemData {
    /// A gift.
    Gift(Gift),
    /// A weapon.
    Weapon(Weapon),
    /// Armor.
    Armor(Armor),
    /// A shield.
    Shield(Shield),
    /// An extra career.
    ExtraCareer(ExtraCareer),
    /// Generic gear.
    Gear(Gear),
}

fn one() -> u32 {
    1
}

/// An item carried by an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique ID.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Weight of one unit in stones.
    #[serde(default)]
    pub weight: f64,
    /// Number of units carried.
    #[serde(default = "one")]
    pub quantity: u32,
    /// Kind-specific data.
    #[serde(flatten)]
    pub data: ItemData,
}

impl Item {
    /// Create an item with a fresh ID, no weight and a quantity of one.
    pub fn new(name: impl Into<String>, data: ItemData) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            weight: 0.0,
            quantity: 1,
            data,
        }
    }

    /// Compare-ready name.
    pub fn key(&self) -> String {
        make_compare_ready(&self.name)
    }

    /// Compare-ready kind name, as used by type filters.
    pub fn kind_key(&self) -> &'static str {
        match self.data {
            ItemData::Gift(_) => "gift",
            ItemData::Weapon(_) => "weapon",
            ItemData::Armor(_) => "armor",
            ItemData::Shield(_) => "shield",
            ItemData::ExtraCareer(_) => "extracareer",
            ItemData::Gear(_) => "gear",
        }
    }

    /// Gift data, if this item is a gift.
    pub fn as_gift(&self) -> Option<&Gift> {
        match &self.data {
            ItemData::Gift(g) => Some(g),
            _ => None,
        }
    }

    /// Mutable gift data, if this item is a gift.
    pub fn as_gift_mut(&mut self) -> Option<&mut Gift> {
        match &mut self.data {
            ItemData::Gift(g) => Some(g),
            _ => None,
        }
    }

    /// Weapon data, if this item is a weapon.
    pub fn as_weapon(&self) -> Option<&Weapon> {
        match &self.data {
            ItemData::Weapon(w) => Some(w),
            _ => None,
        }
    }

    /// Gift tags; empty for other kinds.
    pub fn tags(&self) -> &[String] {
        match &self.data {
            ItemData::Gift(g) => g.tags.as_slice(),
            _ => &[],
        }
    }

    /// Descriptors of weapons and gear; empty for other kinds.
    pub fn descriptors(&self) -> &[String] {
        match &self.data {
            ItemData::Weapon(w) => w.descriptors.as_slice(),
            ItemData::Gear(g) => g.descriptors.as_slice(),
            _ => &[],
        }
    }

    /// Weapon effects; empty for other kinds.
    pub fn effects(&self) -> &[String] {
        self.as_weapon().map_or(&[], |w| w.effects.as_slice())
    }

    /// Every stat the item rolls with.
    pub fn roll_stats(&self) -> Vec<String> {
        let mut stats = Vec::new();
        let rolls: Vec<&StatRoll> = match &self.data {
            ItemData::Gift(g) => vec![&g.use_dice],
            ItemData::Weapon(w) => vec![&w.attack, &w.defense, &w.counter],
            _ => Vec::new(),
        };
        for stat in rolls.into_iter().flat_map(|r| r.stats.iter()) {
            if !stats.contains(stat) {
                stats.push(stat.clone());
            }
        }
        stats
    }

    /// Whether the item is in hand or on the body: readied weapons and gear,
    /// held shields and worn armor.
    pub fn is_readied(&self) -> bool {
        match &self.data {
            ItemData::Weapon(w) => w.readied,
            ItemData::Gear(g) => g.readied,
            ItemData::Shield(s) => s.held,
            ItemData::Armor(a) => a.worn,
            ItemData::Gift(_) | ItemData::ExtraCareer(_) => false,
        }
    }

    /// Total weight of the stack.
    pub fn total_weight(&self) -> f64 {
        self.weight * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_roll_with_separator() {
        let roll = StatRoll::parse("Body, Melee Combat; d8");
        assert_eq!(roll.stats, vec!["body", "meleecombat"]);
        assert_eq!(roll.dice, DiceArray::parse("d8"));
    }

    #[test]
    fn stat_roll_dice_only_or_stats_only() {
        let dice = StatRoll::parse("2d6, d4");
        assert!(dice.stats.is_empty());
        assert_eq!(dice.dice, DiceArray::parse("2d6, d4"));

        let stats = StatRoll::parse("speed, dodge");
        assert_eq!(stats.stats, vec!["speed", "dodge"]);
        assert!(stats.dice.is_empty());
    }

    #[test]
    fn stat_roll_to_string() {
        assert_eq!(String::from(StatRoll::parse("body; d8")), "body; d8");
        assert_eq!(String::from(StatRoll::parse("d8")), "d8");
        assert_eq!(String::from(StatRoll::parse("")), "");
    }

    #[test]
    fn deserialize_weapon() {
        let item: Item = serde_json::from_str(
            r#"{
                "name": "Longsword",
                "type": "weapon",
                "weight": 1.5,
                "readied": true,
                "descriptors": "slashing, sword",
                "equip": "goodhand",
                "range": "close",
                "attack": "body, meleecombat; d8"
            }"#,
        )
        .unwrap();
        assert_eq!(item.kind_key(), "weapon");
        assert_eq!(item.quantity, 1);
        assert!(item.is_readied());
        let weapon = item.as_weapon().unwrap();
        assert_eq!(weapon.equip, Some(Equip::GoodHand));
        assert_eq!(weapon.range, Some(RangeBand::Close));
        assert_eq!(item.descriptors(), ["slashing", "sword"]);
        assert_eq!(item.roll_stats(), vec!["body", "meleecombat"]);
    }

    #[test]
    fn gift_refreshed_state() {
        let mut gift = Gift {
            exhaust_when_used: true,
            ..Gift::default()
        };
        assert!(gift.is_refreshed());
        gift.exhausted = true;
        assert!(!gift.is_refreshed());
        gift.exhaust_when_used = false;
        assert!(gift.is_refreshed());
    }

    #[test]
    fn total_weight_uses_quantity() {
        let mut item = Item::new("Rations", ItemData::Gear(Gear::default()));
        item.weight = 0.25;
        item.quantity = 4;
        assert_eq!(item.total_weight(), 1.0);
    }

    #[test]
    fn range_band_names() {
        assert_eq!(RangeBand::VeryLong.to_string(), "verylong");
        assert_eq!("extreme".parse::<RangeBand>().unwrap(), RangeBand::Extreme);
        assert_eq!(RangeBand::Medium.paces(), 36);
    }

    #[test]
    fn unexpected_equip_and_range_still_load() {
        let item: Item = serde_json::from_str(
            r#"{"name": "Tail Spike", "type": "weapon", "equip": "tail", "range": "spitting"}"#,
        )
        .unwrap();
        let weapon = item.as_weapon().unwrap();
        assert_eq!(weapon.equip, Some(Equip::Unknown));
        assert_eq!(weapon.range, Some(RangeBand::Unknown));
        assert_eq!(Equip::Unknown.key(), None);
        assert_eq!(RangeBand::Short.key().as_deref(), Some("short"));
    }
}
