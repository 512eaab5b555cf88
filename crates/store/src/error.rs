//! Store error types.

use thiserror::Error;

/// Errors that can occur when interacting with a resource store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the given key.
    #[error("record not found: {key}")]
    NotFound { key: String },

    /// A conditional update did not apply because its condition failed.
    ///
    /// For inventory decrements this is the store-native guard that keeps
    /// committed quantity from going negative.
    #[error("conditional update failed for key: {key}")]
    ConditionFailed { key: String },

    /// The store backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if this error is a transport/backend outage.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
