//! Error types for the core model.

/// Errors that can occur while loading or querying the core model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An actor snapshot could not be decoded.
    #[error("invalid actor data: {0}")]
    InvalidActor(#[from] serde_json::Error),

    /// No item with the given id exists on the actor.
    #[error("item {0} not found")]
    ItemNotFound(String),

    /// The item exists but is not a gift.
    #[error("item '{0}' is not a gift")]
    NotAGift(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
