//! Engine configuration.
//!
//! Every process-wide switch the engine reads is carried here and passed in
//! explicitly.

use std::collections::BTreeMap;

use ic_core::Die;
use ic_core::names::make_compare_ready;
use serde::{Deserialize, Serialize};

use crate::error::RulesResult;

/// A currency the actor can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    /// Display name.
    pub name: String,
    /// Value in base currency, a number or fraction such as `"1/12"`.
    pub value: String,
    /// Weight of one coin in grams.
    #[serde(default)]
    pub weight_grams: f64,
    /// Whether the currency is counted at all.
    #[serde(default = "yes")]
    pub used: bool,
}

fn yes() -> bool {
    true
}

impl Currency {
    /// Create a used currency.
    pub fn new(name: impl Into<String>, value: impl Into<String>, weight_grams: f64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            weight_grams,
            used: true,
        }
    }
}

/// Configuration for pool building and derived stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Largest die a burden-limited stat may roll while burdened.
    pub burdened_limit: Die,
    /// Stats limited while burdened.
    pub burdened_list: Vec<String>,
    /// Add and remove encumbrance conditions from carried weight.
    pub manage_encumbrance_auto: bool,
    /// Count coin weight towards carried weight.
    pub coins_have_weight: bool,
    /// Roll each free-text extra dice term as its own array.
    pub extra_dice_ordered: bool,
    /// Known currencies keyed by compare-ready name.
    pub currencies: BTreeMap<String, Currency>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let currencies = [
            ("denar", Currency::new("Denar", "1", 4.5)),
            ("orichalk", Currency::new("Orichalk", "1/12", 4.5)),
            ("aureal", Currency::new("Aureal", "12", 4.5)),
            ("quinqunx", Currency::new("Quinqunx", "144", 22.5)),
        ]
        .into_iter()
        .map(|(k, c)| (k.to_string(), c))
        .collect();
        Self {
            burdened_limit: Die::D8,
            burdened_list: [
                "speed",
                "climbing",
                "dodge",
                "endurance",
                "jumping",
                "stealth",
                "swimming",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            manage_encumbrance_auto: true,
            coins_have_weight: true,
            extra_dice_ordered: false,
            currencies,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON text. Missing keys take their defaults.
    pub fn from_json(text: &str) -> RulesResult<Self> {
        let mut config: EngineConfig = serde_json::from_str(text)?;
        config.burdened_list = config
            .burdened_list
            .iter()
            .map(|s| make_compare_ready(s))
            .collect();
        config.currencies = std::mem::take(&mut config.currencies)
            .into_iter()
            .map(|(k, v)| (make_compare_ready(&k), v))
            .collect();
        Ok(config)
    }

    /// Returns true if the stat is limited while burdened.
    pub fn is_burden_limited(&self, stat: &str) -> bool {
        let key = make_compare_ready(stat);
        self.burdened_list.iter().any(|s| *s == key)
    }

    /// Set automatic encumbrance management.
    pub fn with_auto_encumbrance(mut self, enabled: bool) -> Self {
        self.manage_encumbrance_auto = enabled;
        self
    }

    /// Set whether coins weigh anything.
    pub fn with_coin_weight(mut self, enabled: bool) -> Self {
        self.coins_have_weight = enabled;
        self
    }

    /// Set ordered extra dice.
    pub fn with_ordered_extra_dice(mut self, enabled: bool) -> Self {
        self.extra_dice_ordered = enabled;
        self
    }

    /// Set the burdened die limit.
    pub fn with_burdened_limit(mut self, limit: Die) -> Self {
        self.burdened_limit = limit;
        self
    }

    /// Add or replace a currency.
    pub fn with_currency(mut self, key: &str, currency: Currency) -> Self {
        self.currencies.insert(make_compare_ready(key), currency);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.burdened_limit, Die::D8);
        assert!(config.is_burden_limited("Speed"));
        assert!(!config.is_burden_limited("body"));
        assert!(config.manage_encumbrance_auto);
        assert!(config.currencies.contains_key("denar"));
    }

    #[test]
    fn builder_methods() {
        let config = EngineConfig::default()
            .with_auto_encumbrance(false)
            .with_coin_weight(false)
            .with_ordered_extra_dice(true)
            .with_burdened_limit(Die::D6)
            .with_currency("Bead", Currency::new("Bead", "1/100", 1.0));
        assert!(!config.manage_encumbrance_auto);
        assert!(!config.coins_have_weight);
        assert!(config.extra_dice_ordered);
        assert_eq!(config.burdened_limit, Die::D6);
        assert_eq!(config.currencies["bead"].value, "1/100");
    }

    #[test]
    fn from_json_fills_defaults() {
        let config = EngineConfig::from_json(
            r#"{"burdenedLimit": "d6", "burdenedList": ["Speed", "Climbing"]}"#,
        )
        .unwrap();
        assert_eq!(config.burdened_limit, Die::D6);
        assert_eq!(config.burdened_list, vec!["speed", "climbing"]);
        assert!(config.coins_have_weight);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(EngineConfig::from_json("{\"burdenedLimit\": \"d7\"}").is_err());
    }
}
