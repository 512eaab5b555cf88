//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of a saga instance in its lifecycle.
///
/// State transitions:
/// ```text
/// Started ──► InventoryChecked ──► Priced ──► PointsRedeemed ──► Billed
///     ──► AwaitingCourier ──┬──► Fulfilled
///                           └──► CompensatingInventory ──► CompensatingPoints ──► Failed
/// ```
///
/// A failure before `AwaitingCourier` jumps straight into whichever
/// compensating states its committed steps require (possibly none) and
/// then to `Failed`. Each arrow is taken only after the prior step's
/// side effect, if any, is durably committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Saga created, no step has completed yet.
    #[default]
    Started,

    /// Stock validated; nothing mutated.
    InventoryChecked,

    /// Order total calculated.
    Priced,

    /// Loyalty points zeroed — the first committed side effect.
    PointsRedeemed,

    /// Customer charged.
    Billed,

    /// Suspended on the fulfillment queue, waiting for the worker's
    /// resumption signal.
    AwaitingCourier,

    /// Courier assigned and decrement committed (terminal state).
    Fulfilled,

    /// Rolling back the committed inventory decrement.
    CompensatingInventory,

    /// Restoring redeemed loyalty points.
    CompensatingPoints,

    /// Compensation finished after a failure (terminal state).
    Failed,
}

impl SagaState {
    /// Returns true if the saga is suspended awaiting a fulfillment signal.
    pub fn is_suspended(&self) -> bool {
        matches!(self, SagaState::AwaitingCourier)
    }

    /// Returns true if compensating transactions are in progress.
    pub fn is_compensating(&self) -> bool {
        matches!(
            self,
            SagaState::CompensatingInventory | SagaState::CompensatingPoints
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Fulfilled | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Started => "Started",
            SagaState::InventoryChecked => "InventoryChecked",
            SagaState::Priced => "Priced",
            SagaState::PointsRedeemed => "PointsRedeemed",
            SagaState::Billed => "Billed",
            SagaState::AwaitingCourier => "AwaitingCourier",
            SagaState::Fulfilled => "Fulfilled",
            SagaState::CompensatingInventory => "CompensatingInventory",
            SagaState::CompensatingPoints => "CompensatingPoints",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
