//! Core types for the Ironclaw dice-pool engine.
//!
//! Provides the five-bucket dice array model, name normalisation, the
//! actor / trait / skill / item model, the gift special-setting schema,
//! and the status-condition store boundary. The rule engine that consumes
//! these types lives in `ic-rules`.

pub mod actor;
pub mod condition;
pub mod dice;
pub mod error;
pub mod item;
pub mod names;
pub mod setting;

pub use actor::{Actor, Skill, Trait};
pub use condition::{ConditionStore, Conditions};
pub use dice::{DiceArray, Die};
pub use error::{CoreError, CoreResult};
pub use item::{Item, ItemData, ItemId};
pub use names::{KeyList, make_compare_ready};
pub use setting::{SettingEffect, SettingFilter, SettingMode, SpecialSetting};
