//! Saga instance: state, context, and compensation ledger.

use common::{BookId, ResumptionToken, SagaId, UserId};
use serde::{Deserialize, Serialize};

use crate::context::OrderContext;
use crate::events::{SagaEvent, StepOutput};
use crate::order_fulfillment;
use crate::state::SagaState;

/// A committed side effect, recorded with enough data to compensate it.
///
/// The instance's ordered list of these is the execution record walked
/// in reverse when a later step fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data")]
pub enum CommittedStep {
    /// RedeemPoints zeroed this account.
    PointsRedeemed { user_id: UserId, points: u64 },

    /// The fulfillment worker decremented this book's stock.
    QuantityDecremented { book_id: BookId, quantity: u32 },
}

/// One saga execution, folded from its events.
///
/// Tracks the state machine position, the accumulated [`OrderContext`],
/// and the ledger of committed side effects. Suspended instances are
/// persisted by the orchestrator keyed by resumption token and resumed
/// when the fulfillment worker signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SagaInstance {
    id: Option<SagaId>,
    saga_type: String,
    state: SagaState,
    current_step: usize,
    context: Option<OrderContext>,
    completed_steps: Vec<String>,
    committed: Vec<CommittedStep>,
    compensated_steps: Vec<String>,
    /// Compensation failures, surfaced as secondary diagnostics only.
    compensation_failures: Vec<String>,
    token: Option<ResumptionToken>,
    failure_reason: Option<String>,
}

impl SagaInstance {
    /// Applies an event, advancing state, context, and ledger.
    pub fn apply(&mut self, event: SagaEvent) {
        match event {
            SagaEvent::SagaStarted(data) => {
                self.id = Some(data.saga_id);
                self.saga_type = order_fulfillment::SAGA_TYPE.to_string();
                self.context = Some(OrderContext::new(&data.order));
                self.state = SagaState::Started;
            }
            SagaEvent::StepStarted(_) => {
                self.current_step += 1;
            }
            SagaEvent::StepCompleted(data) => {
                self.completed_steps.push(data.step_name);
                if let Some(context) = self.context.as_mut() {
                    match data.output {
                        StepOutput::InventoryChecked { book } => {
                            context.book = Some(book);
                            self.state = SagaState::InventoryChecked;
                        }
                        StepOutput::TotalCalculated { total } => {
                            context.total = Some(total);
                            self.state = SagaState::Priced;
                        }
                        StepOutput::PointsRedeemed { redemption } => {
                            self.committed.push(CommittedStep::PointsRedeemed {
                                user_id: context.user_id.clone(),
                                points: redemption.points,
                            });
                            context.redeemed = Some(redemption);
                            self.state = SagaState::PointsRedeemed;
                        }
                        StepOutput::CustomerBilled { confirmation } => {
                            context.billing = Some(confirmation);
                            self.state = SagaState::Billed;
                        }
                        StepOutput::CourierAssigned { courier } => {
                            context.courier = Some(courier);
                        }
                    }
                }
            }
            SagaEvent::StepFailed(data) => {
                self.failure_reason = Some(data.error);
            }
            SagaEvent::SagaSuspended(data) => {
                self.token = Some(data.token);
                self.state = SagaState::AwaitingCourier;
            }
            SagaEvent::DecrementCommitted(data) => {
                self.committed.push(CommittedStep::QuantityDecremented {
                    book_id: data.book_id,
                    quantity: data.quantity,
                });
            }
            SagaEvent::CompensationStarted(_) => {
                // State advances per compensation step; the event marks
                // the chain's start for observers.
            }
            SagaEvent::CompensationStepStarted(data) => {
                match data.step_name.as_str() {
                    order_fulfillment::COMP_RESTORE_QUANTITY => {
                        self.state = SagaState::CompensatingInventory;
                    }
                    order_fulfillment::COMP_RESTORE_REDEEMED_POINTS => {
                        self.state = SagaState::CompensatingPoints;
                    }
                    _ => {}
                }
            }
            SagaEvent::CompensationStepCompleted(data) => {
                self.compensated_steps.push(data.step_name);
            }
            SagaEvent::CompensationStepFailed(data) => {
                // Logged, never rethrown; the chain keeps going.
                self.compensation_failures
                    .push(format!("{}: {}", data.step_name, data.error));
            }
            SagaEvent::SagaFulfilled(_) => {
                self.state = SagaState::Fulfilled;
            }
            SagaEvent::SagaFailed(data) => {
                self.state = SagaState::Failed;
                self.failure_reason = Some(data.reason);
            }
        }
    }
}

// Query methods
impl SagaInstance {
    /// Returns the saga instance ID, set once started.
    pub fn id(&self) -> Option<SagaId> {
        self.id
    }

    /// Returns the saga type.
    pub fn saga_type(&self) -> &str {
        &self.saga_type
    }

    /// Returns the saga state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns the accumulated order context, set once started.
    pub fn context(&self) -> Option<&OrderContext> {
        self.context.as_ref()
    }

    /// Returns the list of completed step names.
    pub fn completed_steps(&self) -> &[String] {
        &self.completed_steps
    }

    /// Returns the ledger of committed side effects in commit order.
    pub fn committed(&self) -> &[CommittedStep] {
        &self.committed
    }

    /// Returns the compensation steps that ran to completion, in run order.
    pub fn compensated_steps(&self) -> &[String] {
        &self.compensated_steps
    }

    /// Returns compensation failures recorded as secondary diagnostics.
    pub fn compensation_failures(&self) -> &[String] {
        &self.compensation_failures
    }

    /// Returns the resumption token, set while suspended.
    pub fn token(&self) -> Option<ResumptionToken> {
        self.token
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}
