//! Fulfillment error types.

use common::ResumptionToken;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur in the fulfillment gateway.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// No courier could be assigned to the order.
    #[error("no courier available: {0}")]
    NoCourierAvailable(String),

    /// The resumption token does not match any suspended saga.
    ///
    /// Tokens are consumed exactly once; a second signal for the same
    /// token lands here.
    #[error("unknown or already consumed resumption token: {0}")]
    UnknownToken(ResumptionToken),

    /// The saga behind the token is not awaiting a fulfillment signal.
    #[error("saga not awaiting fulfillment: {0}")]
    InvalidState(String),

    /// The fulfillment queue could not be reached.
    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),

    /// A resource store error surfaced while fulfilling.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A queue message could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for fulfillment operations.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
