//! Saga domain events.

use chrono::{DateTime, Utc};
use common::{BookId, Money, ResumptionToken, SagaId};
use serde::{Deserialize, Serialize};
use store::InventoryRecord;

use crate::context::{OrderRequest, Redemption};

/// Events that can occur during saga execution.
///
/// A saga instance is the fold of its events; the orchestrator records
/// one event per observable transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// Saga execution started.
    SagaStarted(SagaStartedData),

    /// A saga step started execution.
    StepStarted(StepData),

    /// A saga step completed successfully.
    StepCompleted(StepCompletedData),

    /// A saga step failed.
    StepFailed(StepFailedData),

    /// Saga suspended awaiting an asynchronous fulfillment signal.
    SagaSuspended(SagaSuspendedData),

    /// The fulfillment worker committed the inventory decrement.
    DecrementCommitted(DecrementCommittedData),

    /// Compensation started after a step failure.
    CompensationStarted(CompensationData),

    /// A compensation step started execution.
    CompensationStepStarted(StepData),

    /// A compensation step completed successfully.
    CompensationStepCompleted(StepData),

    /// A compensation step failed (logged, compensation continues).
    CompensationStepFailed(StepFailedData),

    /// Saga completed successfully.
    SagaFulfilled(SagaFulfilledData),

    /// Saga failed after compensation.
    SagaFailed(SagaFailedData),
}

impl SagaEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::StepStarted(_) => "StepStarted",
            SagaEvent::StepCompleted(_) => "StepCompleted",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::SagaSuspended(_) => "SagaSuspended",
            SagaEvent::DecrementCommitted(_) => "DecrementCommitted",
            SagaEvent::CompensationStarted(_) => "CompensationStarted",
            SagaEvent::CompensationStepStarted(_) => "CompensationStepStarted",
            SagaEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            SagaEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            SagaEvent::SagaFulfilled(_) => "SagaFulfilled",
            SagaEvent::SagaFailed(_) => "SagaFailed",
        }
    }
}

/// Output a completed step contributes to the order context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StepOutput {
    /// CheckInventory validated stock and returned the record unchanged.
    InventoryChecked { book: InventoryRecord },

    /// CalculateTotal priced the order.
    TotalCalculated { total: Money },

    /// RedeemPoints zeroed the account and recorded the redemption.
    PointsRedeemed { redemption: Redemption },

    /// BillCustomer charged the customer.
    CustomerBilled { confirmation: String },

    /// The fulfillment worker assigned a courier.
    CourierAssigned { courier: String },
}

/// Data for SagaStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStartedData {
    /// The saga instance ID.
    pub saga_id: SagaId,
    /// The order being fulfilled.
    pub order: OrderRequest,
    /// When the saga started.
    pub started_at: DateTime<Utc>,
}

/// Data for step started/completed events (just the step name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    /// The step name.
    pub step_name: String,
}

/// Data for StepCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCompletedData {
    /// The step name.
    pub step_name: String,
    /// What the step produced.
    pub output: StepOutput,
}

/// Data for StepFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailedData {
    /// The step that failed.
    pub step_name: String,
    /// Error message describing the failure.
    pub error: String,
}

/// Data for SagaSuspended event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaSuspendedData {
    /// Token the fulfillment worker will signal back with.
    pub token: ResumptionToken,
    /// When the saga suspended.
    pub suspended_at: DateTime<Utc>,
}

/// Data for DecrementCommitted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecrementCommittedData {
    /// The decremented book.
    pub book_id: BookId,
    /// Units removed from stock.
    pub quantity: u32,
}

/// Data for CompensationStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step that triggered compensation.
    pub from_step: String,
}

/// Data for SagaFulfilled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaFulfilledData {
    /// When the saga completed.
    pub fulfilled_at: DateTime<Utc>,
}

/// Data for SagaFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaFailedData {
    /// Reason for failure.
    pub reason: String,
    /// When the saga failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    /// Creates a SagaStarted event.
    pub fn saga_started(saga_id: SagaId, order: OrderRequest) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            saga_id,
            order,
            started_at: Utc::now(),
        })
    }

    /// Creates a StepStarted event.
    pub fn step_started(step_name: impl Into<String>) -> Self {
        SagaEvent::StepStarted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a StepCompleted event.
    pub fn step_completed(step_name: impl Into<String>, output: StepOutput) -> Self {
        SagaEvent::StepCompleted(StepCompletedData {
            step_name: step_name.into(),
            output,
        })
    }

    /// Creates a StepFailed event.
    pub fn step_failed(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        SagaEvent::StepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates a SagaSuspended event.
    pub fn saga_suspended(token: ResumptionToken) -> Self {
        SagaEvent::SagaSuspended(SagaSuspendedData {
            token,
            suspended_at: Utc::now(),
        })
    }

    /// Creates a DecrementCommitted event.
    pub fn decrement_committed(book_id: BookId, quantity: u32) -> Self {
        SagaEvent::DecrementCommitted(DecrementCommittedData { book_id, quantity })
    }

    /// Creates a CompensationStarted event.
    pub fn compensation_started(from_step: impl Into<String>) -> Self {
        SagaEvent::CompensationStarted(CompensationData {
            from_step: from_step.into(),
        })
    }

    /// Creates a CompensationStepStarted event.
    pub fn compensation_step_started(step_name: impl Into<String>) -> Self {
        SagaEvent::CompensationStepStarted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a CompensationStepCompleted event.
    pub fn compensation_step_completed(step_name: impl Into<String>) -> Self {
        SagaEvent::CompensationStepCompleted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a CompensationStepFailed event.
    pub fn compensation_step_failed(
        step_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        SagaEvent::CompensationStepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates a SagaFulfilled event.
    pub fn saga_fulfilled() -> Self {
        SagaEvent::SagaFulfilled(SagaFulfilledData {
            fulfilled_at: Utc::now(),
        })
    }

    /// Creates a SagaFailed event.
    pub fn saga_failed(reason: impl Into<String>) -> Self {
        SagaEvent::SagaFailed(SagaFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_fulfillment;

    #[test]
    fn test_event_type() {
        let saga_id = SagaId::new();
        let order = OrderRequest::new("book-1", 3, "user-1");

        assert_eq!(
            SagaEvent::saga_started(saga_id, order).event_type(),
            "SagaStarted"
        );
        assert_eq!(
            SagaEvent::step_started(order_fulfillment::STEP_CHECK_INVENTORY).event_type(),
            "StepStarted"
        );
        assert_eq!(
            SagaEvent::step_failed(order_fulfillment::STEP_REDEEM_POINTS, "no account")
                .event_type(),
            "StepFailed"
        );
        assert_eq!(
            SagaEvent::saga_suspended(ResumptionToken::mint()).event_type(),
            "SagaSuspended"
        );
        assert_eq!(
            SagaEvent::decrement_committed(BookId::new("book-1"), 3).event_type(),
            "DecrementCommitted"
        );
        assert_eq!(
            SagaEvent::compensation_started(order_fulfillment::STEP_ASSIGN_COURIER).event_type(),
            "CompensationStarted"
        );
        assert_eq!(SagaEvent::saga_fulfilled().event_type(), "SagaFulfilled");
        assert_eq!(
            SagaEvent::saga_failed("no courier").event_type(),
            "SagaFailed"
        );
    }

    #[test]
    fn test_serialization_roundtrip() {
        let saga_id = SagaId::new();
        let order = OrderRequest::new("book-1", 3, "user-1");

        let events = vec![
            SagaEvent::saga_started(saga_id, order),
            SagaEvent::step_started(order_fulfillment::STEP_CALCULATE_TOTAL),
            SagaEvent::step_completed(
                order_fulfillment::STEP_CALCULATE_TOTAL,
                StepOutput::TotalCalculated {
                    total: Money::from_dollars(60),
                },
            ),
            SagaEvent::step_failed(order_fulfillment::STEP_BILL_CUSTOMER, "declined"),
            SagaEvent::saga_suspended(ResumptionToken::mint()),
            SagaEvent::decrement_committed(BookId::new("book-1"), 3),
            SagaEvent::compensation_started(order_fulfillment::STEP_ASSIGN_COURIER),
            SagaEvent::compensation_step_started(order_fulfillment::COMP_RESTORE_QUANTITY),
            SagaEvent::compensation_step_completed(order_fulfillment::COMP_RESTORE_QUANTITY),
            SagaEvent::compensation_step_failed(
                order_fulfillment::COMP_RESTORE_REDEEMED_POINTS,
                "timeout",
            ),
            SagaEvent::saga_fulfilled(),
            SagaEvent::saga_failed("no courier"),
        ];

        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event.event_type(), deserialized.event_type());
        }
    }

    #[test]
    fn test_step_completed_output() {
        let event = SagaEvent::step_completed(
            order_fulfillment::STEP_REDEEM_POINTS,
            StepOutput::PointsRedeemed {
                redemption: Redemption {
                    total: Money::from_cents(1000),
                    points: 5000,
                },
            },
        );

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();

        if let SagaEvent::StepCompleted(data) = deserialized {
            assert_eq!(data.step_name, "redeem_points");
            if let StepOutput::PointsRedeemed { redemption } = data.output {
                assert_eq!(redemption.points, 5000);
                assert_eq!(redemption.total, Money::from_cents(1000));
            } else {
                panic!("Expected PointsRedeemed output");
            }
        } else {
            panic!("Expected StepCompleted event");
        }
    }
}
