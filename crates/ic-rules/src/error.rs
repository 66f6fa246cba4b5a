//! Error types for the rule engine.

use ic_core::ItemId;

/// Errors that can occur while building or rolling pools.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The actor has no traits and no skills, so there is nothing to roll.
    #[error("actor has no selectable traits or skills")]
    NoSelectableFields,

    /// The external dice roller failed.
    #[error("dice roller failed: {0}")]
    Roller(String),

    /// Writing an item back to storage failed.
    #[error("failed to update item {item}: {message}")]
    Persist {
        /// The item that could not be updated.
        item: ItemId,
        /// What went wrong.
        message: String,
    },

    /// The engine configuration is malformed.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Convenience result type for rule engine operations.
pub type RulesResult<T> = Result<T, RulesError>;
