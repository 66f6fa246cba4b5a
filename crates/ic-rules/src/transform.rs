//! Rules that rewrite an item's roll before it is pooled.

use ic_core::setting::SettingEffect;
use ic_core::{DiceArray, SettingMode, make_compare_ready};

use crate::aggregate::for_each_used;
use crate::book::RuleBook;
use crate::context::QueryContext;

/// Stats after applicable stat change rules, and the label additions they
/// carry.
pub fn change_stats<S: AsRef<str>>(
    book: &RuleBook<'_>,
    ctx: &QueryContext<'_>,
    stats: &[S],
) -> (Vec<String>, Vec<String>) {
    let mut stats: Vec<String> = stats.iter().map(|s| make_compare_ready(s.as_ref())).collect();
    let mut additions = Vec::new();
    for_each_used(book, SettingMode::StatChange, ctx, |used| {
        let SettingEffect::StatChange(change) = &used.setting.effect else {
            return;
        };
        for (from, to) in change.change_from.iter().zip(change.change_to.iter()) {
            for stat in stats.iter_mut().filter(|s| s.as_str() == from) {
                *stat = to.to_string();
            }
        }
        if !change.name_addition.is_empty() {
            additions.push(change.name_addition.clone());
        }
    });
    (stats, additions)
}

/// Dice after applicable upgrade rules, and the label additions they carry.
pub fn upgrade_dice(
    book: &RuleBook<'_>,
    ctx: &QueryContext<'_>,
    dice: DiceArray,
) -> (DiceArray, Vec<String>) {
    let mut dice = dice;
    let mut additions = Vec::new();
    for_each_used(book, SettingMode::DiceUpgrade, ctx, |used| {
        let SettingEffect::DiceUpgrade(upgrade) = &used.setting.effect else {
            return;
        };
        dice = dice.upgrade(upgrade.upgrade_steps);
        if !upgrade.name_addition.is_empty() {
            additions.push(upgrade.name_addition.clone());
        }
    });
    (dice, additions)
}
