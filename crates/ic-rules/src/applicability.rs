//! Deciding whether a rule applies in a given situation.
//!
//! Every field a rule sets must find support in the subject: within one
//! field any listed value is enough, across fields all must hold. Empty
//! fields are wildcards, and item fields are wildcards when no item is
//! being evaluated.

use ic_core::item::{Equip, RangeBand};
use ic_core::setting::{MatchFields, WorksWhen};
use ic_core::{KeyList, make_compare_ready};

use crate::book::{Rule, RuleBook};
use crate::context::{DefenseKind, QueryContext};

/// Returns true if `rule` applies to `ctx`.
///
/// Malformed rules never apply. Fields listed in the rule's `autocheckOnly`
/// set are ignored unless the context is an autocheck evaluation.
pub fn applies(book: &RuleBook<'_>, rule: Rule<'_>, ctx: &QueryContext<'_>) -> bool {
    if book.is_malformed(rule.key()) {
        return false;
    }
    let filter = &rule.setting.filter;
    let deferred = MatchFields::from_keys(filter.autocheck_only.iter());
    let enforced = |field: MatchFields| ctx.autocheck || !deferred.contains(field);

    let works = match filter.works_when {
        WorksWhen::AnyState => true,
        WorksWhen::Refreshed => rule.gift.is_refreshed(),
        WorksWhen::Exhausted => !rule.gift.is_refreshed(),
    };
    if !works {
        return false;
    }

    if let Some(item) = ctx.item {
        let name = [make_compare_ready(&item.name)];
        let kind = [item.kind_key()];
        let (equip, range) = item
            .as_weapon()
            .map(|w| {
                (
                    w.equip.and_then(Equip::key).into_iter().collect::<Vec<_>>(),
                    w.range.and_then(RangeBand::key).into_iter().collect::<Vec<_>>(),
                )
            })
            .unwrap_or_default();
        let item_checks: [(&KeyList, MatchFields, &[String]); 6] = [
            (&filter.name, MatchFields::NAME, &name),
            (&filter.tag, MatchFields::TAG, item.tags()),
            (&filter.descriptor, MatchFields::DESCRIPTOR, item.descriptors()),
            (&filter.effect, MatchFields::EFFECT, item.effects()),
            (&filter.equip, MatchFields::EQUIP, &equip),
            (&filter.range, MatchFields::RANGE, &range),
        ];
        for (list, field, subject) in item_checks {
            if enforced(field) && !supports(list, subject) {
                return false;
            }
        }
        if enforced(MatchFields::TYPE) && !supports(&filter.item_type, &kind) {
            return false;
        }
    }

    if enforced(MatchFields::STAT) && !filter.stat.is_empty() {
        let stats = if ctx.stats.is_empty() {
            ctx.item.map(|i| i.roll_stats()).unwrap_or_default()
        } else {
            ctx.stats.clone()
        };
        let itemless = ctx.item.is_none() && ctx.stats.is_empty();
        if !itemless && !filter.stat.intersects(&stats) {
            return false;
        }
    }

    if enforced(MatchFields::CONDITION) && !filter.condition.is_empty() {
        let names: Vec<&str> = filter.condition.iter().collect();
        if !ctx.conditions.has_any(&names) {
            return false;
        }
    }

    if enforced(MatchFields::OTHER_ITEM) && !filter.other_item.is_empty() {
        let Some(other) = ctx.other_item else {
            return false;
        };
        if !filter.other_item.intersects(other.descriptors.as_slice()) {
            return false;
        }
    }

    if enforced(MatchFields::SECOND_READIED)
        && filter.needs_second_readied
        && book
            .actor()
            .other_readied_weapons(ctx.item.map(|i| i.id))
            == 0
    {
        return false;
    }

    if enforced(MatchFields::DEFENSE) {
        let allowed = match ctx.defense {
            Some(DefenseKind::Dodge) => filter.applies_to_dodges,
            Some(DefenseKind::Parry) => filter.applies_to_parries,
            Some(DefenseKind::Special) => filter.applies_to_special_defenses,
            None => true,
        };
        if !allowed {
            return false;
        }
    }

    if enforced(MatchFields::ONE_IN_ROLL) && filter.requires_one_in_roll && !ctx.has_one_in_roll {
        return false;
    }

    true
}

/// An empty rule list supports anything; otherwise one listed value must
/// appear in the subject.
fn supports<S: AsRef<str>>(list: &KeyList, subject: &[S]) -> bool {
    list.is_empty() || list.intersects(subject)
}
