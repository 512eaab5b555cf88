//! Saga error types.

use common::{BookId, Money, ResumptionToken, SagaId, UserId};
use store::StoreError;
use thiserror::Error;

use crate::state::SagaState;

/// Errors that can occur during saga execution.
///
/// Step failures form a closed taxonomy so the orchestrator and its
/// callers switch on kind, never on message text.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The ordered book does not exist in the inventory store.
    #[error("book not found: {0}")]
    BookNotFound(BookId),

    /// The ordered quantity exceeds the stock on hand.
    #[error("book out of stock: {0}")]
    BookOutOfStock(BookId),

    /// The ordering user has no account record.
    #[error("account not found: {0}")]
    AccountNotFound(UserId),

    /// Redemption-policy rejection: points are only redeemed when the
    /// order total strictly exceeds the available balance.
    #[error("order total {total} does not exceed available points ({points})")]
    InsufficientOrderTotal { total: Money, points: u64 },

    /// The payment gateway declined the charge.
    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    /// The payment gateway could not be reached.
    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// No courier could be assigned during fulfillment.
    #[error("no courier available: {0}")]
    NoCourierAvailable(String),

    /// A resource store failed underneath a step.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The fulfillment queue rejected the hand-off.
    #[error("fulfillment queue unavailable: {0}")]
    QueueUnavailable(String),

    /// A step received malformed input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The resumption token does not match any suspended saga.
    #[error("unknown or already consumed resumption token: {0}")]
    UnknownToken(ResumptionToken),

    /// No saga instance exists under the given ID.
    #[error("saga not found: {0}")]
    SagaNotFound(SagaId),

    /// Saga is in an invalid state for the requested operation.
    #[error("invalid saga state: expected {expected}, actual {actual}")]
    InvalidState { expected: String, actual: SagaState },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
