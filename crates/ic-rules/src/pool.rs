//! Turning a pool construction into the dice arrays handed to the roller.

use ic_core::{Actor, DiceArray, Die, ItemId, make_compare_ready};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::construction::PoolConstruction;
use crate::error::{RulesError, RulesResult};

/// Label of the free-text extra dice.
pub const EXTRA_DICE_LABEL: &str = "Extra dice";

/// Arrays and labels gathered from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolPart {
    /// One array per selected stat or field.
    pub arrays: Vec<DiceArray>,
    /// Label per contribution.
    pub labels: Vec<String>,
}

impl PoolPart {
    fn push(&mut self, dice: DiceArray, label: impl Into<String>) {
        self.arrays.push(dice);
        self.labels.push(label.into());
    }

    /// Labels joined as shown to players.
    pub fn label(&self) -> String {
        self.labels.join(" + ")
    }
}

fn burden_limited(dice: DiceArray, key: &str, burdened: bool, config: &EngineConfig) -> DiceArray {
    if burdened && config.is_burden_limited(key) {
        dice.enforce_limit(config.burdened_limit)
    } else {
        dice
    }
}

/// Flag every wanted name `hit` accepts. Returns true if any did.
fn claim(wanted: &[String], matched: &mut [bool], hit: impl Fn(&str) -> bool) -> bool {
    let mut any = false;
    for (name, seen) in wanted.iter().zip(matched.iter_mut()) {
        if hit(name) {
            *seen = true;
            any = true;
        }
    }
    any
}

/// Gather traits, then extra careers, then skills, each in sheet order.
///
/// Also returns which of `names` selected anything.
fn select<S: AsRef<str>>(
    actor: &Actor,
    names: &[S],
    burdened: bool,
    config: &EngineConfig,
) -> (PoolPart, Vec<bool>) {
    let wanted: Vec<String> = names
        .iter()
        .map(|n| make_compare_ready(n.as_ref()))
        .collect();
    let mut matched = vec![false; wanted.len()];
    let mut part = PoolPart::default();
    let has_extra_careers = actor.extra_careers().next().is_some();

    for t in &actor.traits {
        if claim(&wanted, &mut matched, |name| t.matches(name)) {
            part.push(
                burden_limited(t.dice, &t.key, burdened, config),
                t.pool_label(has_extra_careers),
            );
        }
    }
    for (item, career) in actor.extra_careers() {
        let key = item.key();
        if claim(&wanted, &mut matched, |name| name == key) {
            part.push(
                burden_limited(career.dice, &key, burdened, config),
                &item.name,
            );
        }
    }
    for s in &actor.skills {
        if claim(&wanted, &mut matched, |name| name == s.key) {
            part.push(burden_limited(s.total, &s.key, burdened, config), s.pool_label());
        }
    }
    (part, matched)
}

/// Collect the dice of the named traits and skills.
///
/// Traits are matched by key or alias, extra careers by name and skills by
/// key. The pool follows sheet order rather than the order of `names`.
/// Unknown names are skipped with a warning.
pub fn build_pool<S: AsRef<str>>(
    actor: &Actor,
    names: &[S],
    burdened: bool,
    config: &EngineConfig,
) -> RulesResult<PoolPart> {
    if actor.has_no_stats() {
        return Err(RulesError::NoSelectableFields);
    }
    let (part, matched) = select(actor, names, burdened, config);
    for (name, _) in names.iter().zip(matched).filter(|(_, seen)| !seen) {
        tracing::warn!(stat = name.as_ref(), actor = %actor.name, "no such trait or skill");
    }
    Ok(part)
}

/// Collect the checked fields of `construction` and any free-text extra dice.
pub fn build_extra(construction: &PoolConstruction, raw: &str, config: &EngineConfig) -> PoolPart {
    let mut part = PoolPart::default();
    for field in construction.checked_fields() {
        part.push(field.dice, &field.name);
    }
    let raw = raw.trim();
    if raw.is_empty() {
        return part;
    }
    if config.extra_dice_ordered {
        let terms: Vec<DiceArray> = raw
            .split(',')
            .map(DiceArray::parse)
            .filter(|d| !d.is_empty())
            .collect();
        if !terms.is_empty() {
            part.arrays.extend(terms);
            part.labels.push(EXTRA_DICE_LABEL.to_string());
        }
    } else {
        let dice = DiceArray::parse(raw);
        if !dice.is_empty() {
            part.push(dice, EXTRA_DICE_LABEL);
        }
    }
    part
}

/// How the final pool is adjusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolOptions {
    /// Cap every array at this die.
    pub limit: Option<Die>,
    /// Roll every die twice, as for weak pools.
    pub double: bool,
}

/// A gift to exhaust once the roll succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhaustRecord {
    /// The gift.
    pub item: ItemId,
    /// Gift name, for reporting.
    pub name: String,
}

/// The pool ready for the roller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedPool {
    /// Arrays in pool order, none empty.
    pub pools: Vec<DiceArray>,
    /// Roll label.
    pub label: String,
    /// Gifts to exhaust after the roll.
    pub exhaust: Vec<ExhaustRecord>,
}

impl FinishedPool {
    /// All arrays summed.
    pub fn total(&self) -> DiceArray {
        self.pools.iter().sum()
    }
}

/// Concatenate stat and extra parts into the final pool.
pub fn finish(
    construction: &PoolConstruction,
    pool: PoolPart,
    extra: PoolPart,
    options: PoolOptions,
) -> FinishedPool {
    let pools = pool
        .arrays
        .into_iter()
        .chain(extra.arrays)
        .filter(|d| !d.is_empty())
        .map(|d| if options.double { d + d } else { d })
        .map(|d| match options.limit {
            Some(limit) => d.enforce_limit(limit),
            None => d,
        })
        .collect();

    let mut label = construction.label.clone();
    let parts: Vec<String> = pool.labels.into_iter().chain(extra.labels).collect();
    if !parts.is_empty() {
        if !label.is_empty() {
            label.push_str(": ");
        }
        label.push_str(&parts.join(" + "));
    }

    let mut exhaust: Vec<ExhaustRecord> = Vec::new();
    for field in construction.checked_fields().filter(|f| f.exhausts_on_use) {
        let Some(item) = field.source else {
            continue;
        };
        if !exhaust.iter().any(|r| r.item == item) {
            exhaust.push(ExhaustRecord {
                item,
                name: field.name.clone(),
            });
        }
    }

    FinishedPool {
        pools,
        label,
        exhaust,
    }
}

/// Interpret a dice limit typed by the user.
///
/// A stat name limits to the stat's largest die (d4 when the stat has no
/// dice), otherwise a die such as `d8` limits to that die, otherwise a
/// number limits to the largest die not above it. Anything else is no limit.
pub fn resolve_limit(
    actor: &Actor,
    text: &str,
    burdened: bool,
    config: &EngineConfig,
) -> Option<Die> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (stat, _) = select(actor, &[text], burdened, config);
    if !stat.arrays.is_empty() {
        let dice: DiceArray = stat.arrays.iter().sum();
        return Some(dice.max_die().unwrap_or(Die::D4));
    }
    if let Some(die) = Die::from_str_tag(text) {
        return Some(die);
    }
    if let Ok(face) = text.parse::<u32>() {
        return Some(Die::at_most(face));
    }
    tracing::warn!(limit = text, "not a stat, die or number; ignoring limit");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::PoolField;
    use crate::testing::actor;
    use serde_json::json;

    fn hero() -> Actor {
        actor(json!({
            "name": "Vera",
            "traits": [
                {"key": "body", "dice": "d8"},
                {"key": "speed", "dice": "d12"},
                {"key": "species", "name": "Vulpin", "dice": "d8", "skills": "stealth"}
            ],
            "skills": [{"key": "stealth", "name": "Stealth", "marks": 5}]
        }))
    }

    #[test]
    fn empty_actor_has_nothing_to_select() {
        let empty = actor(json!({"name": "Nobody"}));
        let result = build_pool(&empty, &["body"], false, &EngineConfig::default());
        assert!(matches!(result, Err(RulesError::NoSelectableFields)));
    }

    #[test]
    fn stats_by_key_alias_and_skill() {
        let actor = hero();
        let names = ["Body", "vulpin", "stealth", "nope"];
        let part = build_pool(&actor, &names, false, &EngineConfig::default()).unwrap();
        assert_eq!(part.label(), "Body + Species + Stealth");
        assert_eq!(part.arrays[2], DiceArray::parse("d12, d8"));
    }

    #[test]
    fn pool_follows_sheet_order() {
        let actor = actor(json!({
            "name": "Vera",
            "traits": [
                {"key": "body", "dice": "d8"},
                {"key": "career", "name": "Thief", "dice": "d6", "skills": "stealth"},
                {"key": "speed", "dice": "d12"}
            ],
            "skills": [{"key": "stealth", "name": "Stealth", "marks": 1}],
            "items": [
                {"name": "Sailor", "type": "extraCareer", "dice": "d10"}
            ]
        }));
        let names = ["stealth", "sailor", "speed", "thief", "body"];
        let part = build_pool(&actor, &names, false, &EngineConfig::default()).unwrap();
        assert_eq!(part.label(), "Body + Thief + Speed + Sailor + Stealth");
        assert_eq!(part.arrays[3], DiceArray::parse("d10"));
    }

    #[test]
    fn stat_names_win_over_dice_and_numbers() {
        let actor = actor(json!({
            "name": "Odd",
            "traits": [{"key": "body", "dice": "d6"}],
            "skills": [{"key": "d8", "name": "D8"}, {"key": "12", "name": "Twelve", "marks": 3}]
        }));
        let config = EngineConfig::default();
        assert_eq!(resolve_limit(&actor, "d8", false, &config), Some(Die::D4));
        assert_eq!(resolve_limit(&actor, "12", false, &config), Some(Die::D8));
        assert_eq!(resolve_limit(&actor, "d10", false, &config), Some(Die::D10));
    }

    #[test]
    fn burden_limits_listed_stats() {
        let actor = hero();
        let config = EngineConfig::default();
        let part = build_pool(&actor, &["speed", "body"], true, &config).unwrap();
        assert_eq!(part.arrays[0], DiceArray::parse("d8"));
        assert_eq!(part.arrays[1], DiceArray::parse("d8"));
        let stealth = build_pool(&actor, &["stealth"], true, &config).unwrap();
        assert_eq!(stealth.arrays[0], DiceArray::parse("2d8"));
    }

    #[test]
    fn extra_dice_ordered_or_merged() {
        let mut c = PoolConstruction::new();
        c.insert_field(PoolField::new("guard", "Guarding", DiceArray::parse("d8")));
        c.insert_field(PoolField::new("off", "Unused", DiceArray::parse("d12")).checked(false));

        let merged = build_extra(&c, "d6, 2d4", &EngineConfig::default());
        assert_eq!(
            merged.arrays,
            vec![DiceArray::parse("d8"), DiceArray::parse("d6, 2d4")]
        );

        let ordered_config = EngineConfig::default().with_ordered_extra_dice(true);
        let ordered = build_extra(&c, "d6, 2d4", &ordered_config);
        assert_eq!(ordered.arrays.len(), 3);
        assert_eq!(ordered.label(), "Guarding + Extra dice");
    }

    #[test]
    fn finish_doubles_limits_and_records_exhaustion() {
        let gift = ItemId::new();
        let mut c = PoolConstruction::new();
        c.push_label("Soak");
        for (id, dice) in [("g", "d10"), ("h", "d6")] {
            c.insert_field(
                PoolField::new(id, "Hardy", DiceArray::parse(dice)).from_source(gift, true),
            );
        }
        let pool = PoolPart {
            arrays: vec![DiceArray::parse("d8"), DiceArray::EMPTY],
            labels: vec!["Body".into()],
        };
        let extra = build_extra(&c, "", &EngineConfig::default());
        let finished = finish(
            &c,
            pool,
            extra,
            PoolOptions {
                limit: Some(Die::D8),
                double: true,
            },
        );
        assert_eq!(
            finished.pools,
            vec![
                DiceArray::parse("2d8"),
                DiceArray::parse("2d8"),
                DiceArray::parse("2d6")
            ]
        );
        assert_eq!(finished.exhaust.len(), 1);
        assert_eq!(finished.total(), DiceArray::parse("4d8, 2d6"));
        insta::assert_snapshot!(finished.label, @"Soak: Body + Hardy + Hardy");
    }

    #[test]
    fn limits_from_text() {
        let actor = hero();
        let config = EngineConfig::default();
        assert_eq!(resolve_limit(&actor, "d6", false, &config), Some(Die::D6));
        assert_eq!(resolve_limit(&actor, "9", false, &config), Some(Die::D8));
        assert_eq!(resolve_limit(&actor, "speed", false, &config), Some(Die::D12));
        assert_eq!(resolve_limit(&actor, "speed", true, &config), Some(Die::D8));
        assert_eq!(resolve_limit(&actor, "", false, &config), None);
        assert_eq!(resolve_limit(&actor, "banana", false, &config), None);
    }
}
