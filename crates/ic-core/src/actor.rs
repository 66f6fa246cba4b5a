//! Actors: traits, skills, items, conditions and coinage.
//!
//! An actor snapshot is loaded from JSON and then prepared, which normalises
//! keys and derives every skill's dice from its marks, gift marks, feeding
//! traits and extra careers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::Conditions;
use crate::dice::DiceArray;
use crate::error::{CoreError, CoreResult};
use crate::item::{Armor, ExtraCareer, Item, ItemData, ItemId, Shield};
use crate::names::{KeyList, display_key, make_compare_ready};

/// A trait such as Body or Speed, or a species/career trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    /// Compare-ready key (`body`, `species`, `career`).
    pub key: String,
    /// Display alias, such as the species or career name.
    #[serde(default)]
    pub name: Option<String>,
    /// Trait dice.
    pub dice: DiceArray,
    /// Skills this trait feeds (species and career traits).
    #[serde(default)]
    pub skills: KeyList,
}

impl Trait {
    /// Name shown in pool labels.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Label in a rolled pool. The career trait shows its name once extra
    /// careers need telling apart; every other trait shows its key.
    pub fn pool_label(&self, has_extra_careers: bool) -> String {
        match &self.name {
            Some(name) if has_extra_careers && self.key == "career" => name.clone(),
            _ => display_key(&self.key),
        }
    }

    /// Returns true if `name` selects this trait by key or alias.
    pub fn matches(&self, name: &str) -> bool {
        let name = make_compare_ready(name);
        self.key == name
            || self
                .name
                .as_deref()
                .is_some_and(|alias| make_compare_ready(alias) == name)
    }
}

/// A skill with marks and derived dice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Compare-ready key.
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Marks bought in the skill.
    #[serde(default)]
    pub marks: u32,
    /// Dice from marks and gift marks.
    #[serde(skip)]
    pub own: DiceArray,
    /// Own dice plus every feeding trait and extra career.
    #[serde(skip)]
    pub total: DiceArray,
}

impl Skill {
    /// Name shown in pool labels.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.key
        } else {
            &self.name
        }
    }

    /// Label in a rolled pool.
    pub fn pool_label(&self) -> String {
        if self.name.is_empty() {
            display_key(&self.key)
        } else {
            self.name.clone()
        }
    }
}

/// A character snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    /// Character name.
    pub name: String,
    /// Traits in sheet order.
    pub traits: Vec<Trait>,
    /// Skills in sheet order.
    pub skills: Vec<Skill>,
    /// Items in stored order.
    pub items: Vec<Item>,
    /// Active status conditions.
    pub conditions: Conditions,
    /// Coin amounts keyed by currency.
    pub coinage: BTreeMap<String, u64>,
}

impl Actor {
    /// Decode and prepare an actor from JSON text.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let mut actor: Actor = serde_json::from_str(text)?;
        actor.prepare();
        Ok(actor)
    }

    /// Normalise keys and derive skill dice.
    pub fn prepare(&mut self) {
        for t in &mut self.traits {
            t.key = make_compare_ready(&t.key);
        }
        for skill in &mut self.skills {
            skill.key = make_compare_ready(&skill.key);
        }
        self.coinage = std::mem::take(&mut self.coinage)
            .into_iter()
            .map(|(k, v)| (make_compare_ready(&k), v))
            .collect();

        let mut derived = Vec::with_capacity(self.skills.len());
        for skill in &self.skills {
            let gift_marks = self
                .items
                .iter()
                .filter_map(Item::as_gift)
                .filter(|g| {
                    g.grants_mark
                        .as_deref()
                        .is_some_and(|m| make_compare_ready(m) == skill.key)
                })
                .count() as u32;
            let own = DiceArray::from_marks(skill.marks + gift_marks);
            let from_traits: DiceArray = self
                .traits
                .iter()
                .filter(|t| t.skills.contains(&skill.key))
                .map(|t| t.dice)
                .sum();
            let from_careers: DiceArray = self
                .extra_careers()
                .filter(|(_, c)| c.skills.contains(&skill.key))
                .map(|(_, c)| c.dice)
                .sum();
            derived.push((own, own + from_traits + from_careers));
        }
        for (skill, (own, total)) in self.skills.iter_mut().zip(derived) {
            skill.own = own;
            skill.total = total;
        }
    }

    /// Find a trait by key or alias.
    pub fn find_trait(&self, name: &str) -> Option<&Trait> {
        self.traits.iter().find(|t| t.matches(name))
    }

    /// Find a skill by key.
    pub fn find_skill(&self, name: &str) -> Option<&Skill> {
        let key = make_compare_ready(name);
        self.skills.iter().find(|s| s.key == key)
    }

    /// Dice of a trait or skill by name; traits win on a name clash.
    pub fn stat_dice(&self, name: &str) -> Option<DiceArray> {
        self.find_trait(name)
            .map(|t| t.dice)
            .or_else(|| self.find_skill(name).map(|s| s.total))
    }

    /// Extra career items in stored order.
    pub fn extra_careers(&self) -> impl Iterator<Item = (&Item, &ExtraCareer)> {
        self.items.iter().filter_map(|i| match &i.data {
            ItemData::ExtraCareer(c) => Some((i, c)),
            _ => None,
        })
    }

    /// Returns true if the actor has nothing a pool could select.
    pub fn has_no_stats(&self) -> bool {
        self.traits.is_empty() && self.skills.is_empty()
    }

    /// Look up an item by ID.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Look up an item by name (case and whitespace insensitive).
    pub fn item_named(&self, name: &str) -> Option<&Item> {
        let key = make_compare_ready(name);
        self.items.iter().find(|i| i.key() == key)
    }

    /// Set a gift's exhaust flag. Gifts that never exhaust are left alone.
    pub fn set_gift_exhausted(&mut self, id: ItemId, exhausted: bool) -> CoreResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;
        let name = item.name.clone();
        let gift = item.as_gift_mut().ok_or(CoreError::NotAGift(name))?;
        if gift.exhaust_when_used {
            gift.exhausted = exhausted;
        }
        Ok(())
    }

    /// Worn armor, at most three pieces, in stored order.
    pub fn worn_armor(&self) -> Vec<(&Item, &Armor)> {
        self.items
            .iter()
            .filter_map(|i| match &i.data {
                ItemData::Armor(a) if a.worn => Some((i, a)),
                _ => None,
            })
            .take(3)
            .collect()
    }

    /// Number of worn armor pieces, uncapped.
    pub fn worn_armor_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(&i.data, ItemData::Armor(a) if a.worn))
            .count()
    }

    /// The first held shield.
    pub fn held_shield(&self) -> Option<(&Item, &Shield)> {
        self.items.iter().find_map(|i| match &i.data {
            ItemData::Shield(s) if s.held => Some((i, s)),
            _ => None,
        })
    }

    /// Readied weapons other than `except`.
    pub fn other_readied_weapons(&self, except: Option<ItemId>) -> usize {
        self.items
            .iter()
            .filter(|i| Some(i.id) != except)
            .filter(|i| i.as_weapon().is_some_and(|w| w.readied))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_actor() -> Actor {
        Actor::from_json(
            r#"{
                "name": "Ayla",
                "traits": [
                    {"key": "Body", "dice": "d6"},
                    {"key": "Speed", "dice": "d8"},
                    {"key": "species", "name": "Wolf", "dice": "d10", "skills": "dodge, tracking"}
                ],
                "skills": [
                    {"key": "Dodge", "marks": 2},
                    {"key": "tracking", "marks": 4},
                    {"key": "stealth", "marks": 7}
                ],
                "items": [
                    {"name": "Keen Nose", "type": "gift", "grantsMark": "Tracking"},
                    {"name": "Scout", "type": "extraCareer", "dice": "d4", "skills": "stealth"},
                    {"name": "Leather", "type": "armor", "worn": true, "dice": "d6"},
                    {"name": "Buckler", "type": "shield", "held": true, "dice": "d4"}
                ],
                "coinage": {"Denar": 12}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn prepare_normalises_keys() {
        let actor = test_actor();
        assert_eq!(actor.traits[0].key, "body");
        assert_eq!(actor.skills[0].key, "dodge");
        assert_eq!(actor.coinage.get("denar"), Some(&12));
    }

    #[test]
    fn skill_totals_include_traits_and_careers() {
        let actor = test_actor();
        let dodge = actor.find_skill("dodge").unwrap();
        assert_eq!(dodge.own, DiceArray::parse("d6"));
        assert_eq!(dodge.total, DiceArray::parse("d10, d6"));

        let tracking = actor.find_skill("Tracking").unwrap();
        assert_eq!(tracking.own, DiceArray::parse("d12"));
        assert_eq!(tracking.total, DiceArray::parse("d12, d10"));

        let stealth = actor.find_skill("stealth").unwrap();
        assert_eq!(stealth.own, DiceArray::parse("d12, d6"));
        assert_eq!(stealth.total, DiceArray::parse("d12, d6, d4"));
    }

    #[test]
    fn trait_lookup_by_alias() {
        let actor = test_actor();
        assert_eq!(actor.find_trait("wolf").unwrap().key, "species");
        assert_eq!(actor.stat_dice("Wolf"), Some(DiceArray::parse("d10")));
        assert_eq!(actor.stat_dice("missing"), None);
    }

    #[test]
    fn armor_and_shield() {
        let actor = test_actor();
        assert_eq!(actor.worn_armor().len(), 1);
        assert_eq!(actor.held_shield().unwrap().0.name, "Buckler");
        assert_eq!(actor.other_readied_weapons(None), 0);
    }

    #[test]
    fn exhaust_gift() {
        let mut actor = test_actor();
        let id = actor.item_named("keen nose").unwrap().id;
        actor.set_gift_exhausted(id, true).unwrap();
        assert!(!actor.item(id).unwrap().as_gift().unwrap().exhausted);

        actor.items[0].as_gift_mut().unwrap().exhaust_when_used = true;
        actor.set_gift_exhausted(id, true).unwrap();
        assert!(actor.item(id).unwrap().as_gift().unwrap().exhausted);

        let armor = actor.item_named("Leather").unwrap().id;
        assert!(matches!(
            actor.set_gift_exhausted(armor, true),
            Err(CoreError::NotAGift(_))
        ));
    }
}
