//! Saga orchestrator for multi-step order fulfillment.

use std::collections::HashMap;

use async_trait::async_trait;
use common::{ResumptionToken, SagaId};
use fulfillment::{
    CourierAssignment, FulfillmentError, FulfillmentQueue, FulfillmentRequest, ResumptionSignal,
    TaskFailure, TaskFailureKind,
};
use std::sync::Arc;
use store::{AccountStore, InventoryStore, StoreError};
use tokio::sync::RwLock;

use crate::compensation;
use crate::config::SagaConfig;
use crate::context::OrderRequest;
use crate::error::{Result, SagaError};
use crate::events::{SagaEvent, StepOutput};
use crate::instance::{CommittedStep, SagaInstance};
use crate::order_fulfillment;
use crate::services::billing::BillingGateway;
use crate::state::SagaState;
use crate::steps;

/// Handle returned when a saga suspends for asynchronous fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SagaHandle {
    /// The saga instance ID, for registry lookups.
    pub saga_id: SagaId,
    /// The token the fulfillment worker will signal back with.
    pub token: ResumptionToken,
}

/// Orchestrates order-fulfillment sagas.
///
/// Drives the synchronous steps (check inventory, price, redeem points,
/// bill) in sequence, then suspends on the fulfillment queue and waits
/// for the worker's resumption signal. On any failure after a committed
/// side effect, compensations run in strict reverse order of
/// commitment, best-effort, before the originating error is reported.
///
/// All collaborators are injected at construction; the orchestrator
/// holds no global state. Suspended instances live in an in-process
/// registry keyed by saga ID, with a token index mapping each
/// outstanding resumption token to its saga.
pub struct SagaOrchestrator<I, A, B, Q>
where
    I: InventoryStore,
    A: AccountStore,
    B: BillingGateway,
    Q: FulfillmentQueue,
{
    inventory: I,
    accounts: A,
    billing: B,
    queue: Q,
    config: SagaConfig,
    sagas: Arc<RwLock<HashMap<SagaId, SagaInstance>>>,
    tokens: Arc<RwLock<HashMap<ResumptionToken, SagaId>>>,
}

impl<I, A, B, Q> SagaOrchestrator<I, A, B, Q>
where
    I: InventoryStore,
    A: AccountStore,
    B: BillingGateway,
    Q: FulfillmentQueue,
{
    /// Creates a new orchestrator with the default configuration.
    pub fn new(inventory: I, accounts: A, billing: B, queue: Q) -> Self {
        Self::with_config(inventory, accounts, billing, queue, SagaConfig::default())
    }

    /// Creates a new orchestrator with an explicit configuration.
    pub fn with_config(inventory: I, accounts: A, billing: B, queue: Q, config: SagaConfig) -> Self {
        Self {
            inventory,
            accounts,
            billing,
            queue,
            config,
            sagas: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Executes the synchronous half of an order-fulfillment saga.
    ///
    /// Runs CheckInventory, CalculateTotal, RedeemPoints and
    /// BillCustomer in order, then enqueues the fulfillment request and
    /// suspends. A step failure aborts with that step's error after
    /// compensating whatever had committed; the failed instance stays
    /// queryable via [`Self::get_saga`].
    #[tracing::instrument(skip(self), fields(saga_type = order_fulfillment::SAGA_TYPE))]
    pub async fn start_saga(&self, order: OrderRequest) -> Result<SagaHandle> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = std::time::Instant::now();

        let saga_id = SagaId::new();
        let mut saga = SagaInstance::default();
        self.record(saga_id, &mut saga, SagaEvent::saga_started(saga_id, order.clone()))
            .await;

        // Step 1: CheckInventory — validation only; the decrement
        // commits at fulfillment time.
        tracing::info!(step = order_fulfillment::STEP_CHECK_INVENTORY, "saga step started");
        self.record(
            saga_id,
            &mut saga,
            SagaEvent::step_started(order_fulfillment::STEP_CHECK_INVENTORY),
        )
        .await;

        let book = match steps::check_inventory(
            &self.inventory,
            &order.book_id,
            order.quantity,
            self.config.allow_exact_depletion,
        )
        .await
        {
            Ok(book) => {
                self.record(
                    saga_id,
                    &mut saga,
                    SagaEvent::step_completed(
                        order_fulfillment::STEP_CHECK_INVENTORY,
                        StepOutput::InventoryChecked { book: book.clone() },
                    ),
                )
                .await;
                book
            }
            Err(e) => {
                let error = self
                    .fail_saga(saga_id, &mut saga, order_fulfillment::STEP_CHECK_INVENTORY, e)
                    .await;
                metrics::histogram!("saga_duration_seconds")
                    .record(saga_start.elapsed().as_secs_f64());
                return Err(error);
            }
        };

        // Step 2: CalculateTotal
        tracing::info!(step = order_fulfillment::STEP_CALCULATE_TOTAL, "saga step started");
        self.record(
            saga_id,
            &mut saga,
            SagaEvent::step_started(order_fulfillment::STEP_CALCULATE_TOTAL),
        )
        .await;

        let total = match steps::calculate_total(&book, order.quantity) {
            Ok(total) => {
                self.record(
                    saga_id,
                    &mut saga,
                    SagaEvent::step_completed(
                        order_fulfillment::STEP_CALCULATE_TOTAL,
                        StepOutput::TotalCalculated { total },
                    ),
                )
                .await;
                total
            }
            Err(e) => {
                let error = self
                    .fail_saga(saga_id, &mut saga, order_fulfillment::STEP_CALCULATE_TOTAL, e)
                    .await;
                metrics::histogram!("saga_duration_seconds")
                    .record(saga_start.elapsed().as_secs_f64());
                return Err(error);
            }
        };

        // Step 3: RedeemPoints — first commit point.
        tracing::info!(step = order_fulfillment::STEP_REDEEM_POINTS, "saga step started");
        self.record(
            saga_id,
            &mut saga,
            SagaEvent::step_started(order_fulfillment::STEP_REDEEM_POINTS),
        )
        .await;

        let redemption = match steps::redeem_points(&self.accounts, &order.user_id, total).await {
            Ok(redemption) => {
                self.record(
                    saga_id,
                    &mut saga,
                    SagaEvent::step_completed(
                        order_fulfillment::STEP_REDEEM_POINTS,
                        StepOutput::PointsRedeemed {
                            redemption: redemption.clone(),
                        },
                    ),
                )
                .await;
                redemption
            }
            Err(e) => {
                let error = self
                    .fail_saga(saga_id, &mut saga, order_fulfillment::STEP_REDEEM_POINTS, e)
                    .await;
                metrics::histogram!("saga_duration_seconds")
                    .record(saga_start.elapsed().as_secs_f64());
                return Err(error);
            }
        };

        // Step 4: BillCustomer — charges the remaining total.
        tracing::info!(step = order_fulfillment::STEP_BILL_CUSTOMER, "saga step started");
        self.record(
            saga_id,
            &mut saga,
            SagaEvent::step_started(order_fulfillment::STEP_BILL_CUSTOMER),
        )
        .await;

        match steps::bill_customer(&self.billing, &order.user_id, redemption.total).await {
            Ok(confirmation) => {
                self.record(
                    saga_id,
                    &mut saga,
                    SagaEvent::step_completed(
                        order_fulfillment::STEP_BILL_CUSTOMER,
                        StepOutput::CustomerBilled { confirmation },
                    ),
                )
                .await;
            }
            Err(e) => {
                let error = self
                    .fail_saga(saga_id, &mut saga, order_fulfillment::STEP_BILL_CUSTOMER, e)
                    .await;
                metrics::histogram!("saga_duration_seconds")
                    .record(saga_start.elapsed().as_secs_f64());
                return Err(error);
            }
        }

        // Step 5: AssignCourier — suspend on the fulfillment queue. The
        // instance is persisted keyed by token before the hand-off.
        let token = ResumptionToken::mint();
        self.record(saga_id, &mut saga, SagaEvent::saga_suspended(token))
            .await;
        self.tokens.write().await.insert(token, saga_id);

        let request = FulfillmentRequest::new(order.book_id.clone(), order.quantity, token);
        if let Err(e) = self.queue.enqueue(&request).await {
            self.tokens.write().await.remove(&token);
            let error = self
                .fail_saga(
                    saga_id,
                    &mut saga,
                    order_fulfillment::STEP_ASSIGN_COURIER,
                    SagaError::QueueUnavailable(e.to_string()),
                )
                .await;
            metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());
            return Err(error);
        }

        metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());
        tracing::info!(%saga_id, %token, "saga suspended awaiting courier");

        Ok(SagaHandle { saga_id, token })
    }

    /// Resumes a suspended saga with a successful courier assignment.
    ///
    /// The worker's decrement is recorded as committed before the saga
    /// reaches `Fulfilled`. Consumes the token.
    #[tracing::instrument(skip(self, courier))]
    pub async fn resume_success(
        &self,
        token: ResumptionToken,
        courier: CourierAssignment,
    ) -> Result<SagaId> {
        let saga_id = self.consume_token(&token).await?;
        let mut saga = self.load(saga_id).await?;
        self.ensure_awaiting(&saga)?;
        let Some(context) = saga.context().cloned() else {
            return Err(SagaError::SagaNotFound(saga_id));
        };

        self.record(
            saga_id,
            &mut saga,
            SagaEvent::decrement_committed(context.book_id.clone(), context.quantity),
        )
        .await;
        self.record(
            saga_id,
            &mut saga,
            SagaEvent::step_completed(
                order_fulfillment::STEP_ASSIGN_COURIER,
                StepOutput::CourierAssigned {
                    courier: courier.courier,
                },
            ),
        )
        .await;
        self.record(saga_id, &mut saga, SagaEvent::saga_fulfilled())
            .await;

        metrics::counter!("saga_fulfilled").increment(1);
        tracing::info!(%saga_id, "saga fulfilled");
        Ok(saga_id)
    }

    /// Resumes a suspended saga into compensation after a failed
    /// fulfillment task.
    ///
    /// If the worker had already committed the inventory decrement, it
    /// is recorded first so the compensation chain rolls it back.
    /// Consumes the token. Returns `Ok` once the signal is processed;
    /// the originating error lands on the saga instance.
    #[tracing::instrument(skip(self, failure))]
    pub async fn resume_failure(
        &self,
        token: ResumptionToken,
        failure: TaskFailure,
    ) -> Result<SagaId> {
        let saga_id = self.consume_token(&token).await?;
        let mut saga = self.load(saga_id).await?;
        self.ensure_awaiting(&saga)?;
        let Some(context) = saga.context().cloned() else {
            return Err(SagaError::SagaNotFound(saga_id));
        };

        if failure.decrement_committed {
            self.record(
                saga_id,
                &mut saga,
                SagaEvent::decrement_committed(context.book_id.clone(), context.quantity),
            )
            .await;
        }

        let error = match failure.kind {
            TaskFailureKind::NoCourierAvailable => SagaError::NoCourierAvailable(failure.cause),
            TaskFailureKind::OutOfStock => SagaError::BookOutOfStock(context.book_id.clone()),
            TaskFailureKind::StoreUnavailable => {
                SagaError::StoreUnavailable(StoreError::Unavailable(failure.cause))
            }
        };
        self.fail_saga(saga_id, &mut saga, order_fulfillment::STEP_ASSIGN_COURIER, error)
            .await;

        Ok(saga_id)
    }

    /// Returns a saga instance by ID, if known to this orchestrator.
    pub async fn get_saga(&self, saga_id: SagaId) -> Option<SagaInstance> {
        self.sagas.read().await.get(&saga_id).cloned()
    }

    /// Returns the number of sagas currently suspended on a token.
    pub async fn suspended_count(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Records a step failure, compensates committed steps, and marks
    /// the saga failed. Returns the originating error for the caller to
    /// report.
    async fn fail_saga(
        &self,
        saga_id: SagaId,
        saga: &mut SagaInstance,
        step: &str,
        error: SagaError,
    ) -> SagaError {
        self.record(saga_id, saga, SagaEvent::step_failed(step, error.to_string()))
            .await;
        self.compensate(saga_id, saga, step).await;
        self.record(saga_id, saga, SagaEvent::saga_failed(error.to_string()))
            .await;
        metrics::counter!("saga_failed").increment(1);
        tracing::warn!(%saga_id, step, error = %error, "saga failed");
        error
    }

    /// Runs compensating transactions in strict reverse order of
    /// commitment, best-effort: a failed compensation is logged and
    /// recorded as a secondary diagnostic, and the chain continues.
    #[tracing::instrument(skip(self, saga))]
    async fn compensate(&self, saga_id: SagaId, saga: &mut SagaInstance, from_step: &str) {
        let committed = saga.committed().to_vec();
        if committed.is_empty() {
            return;
        }

        metrics::counter!("saga_compensations_total").increment(1);
        self.record(saga_id, saga, SagaEvent::compensation_started(from_step))
            .await;

        for step in committed.iter().rev() {
            match step {
                CommittedStep::QuantityDecremented { book_id, quantity } => {
                    self.record(
                        saga_id,
                        saga,
                        SagaEvent::compensation_step_started(
                            order_fulfillment::COMP_RESTORE_QUANTITY,
                        ),
                    )
                    .await;
                    match compensation::restore_quantity(&self.inventory, book_id, *quantity).await
                    {
                        Ok(()) => {
                            metrics::counter!("compensation_steps_total").increment(1);
                            self.record(
                                saga_id,
                                saga,
                                SagaEvent::compensation_step_completed(
                                    order_fulfillment::COMP_RESTORE_QUANTITY,
                                ),
                            )
                            .await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                %saga_id,
                                step = order_fulfillment::COMP_RESTORE_QUANTITY,
                                error = %e,
                                "compensation step failed"
                            );
                            self.record(
                                saga_id,
                                saga,
                                SagaEvent::compensation_step_failed(
                                    order_fulfillment::COMP_RESTORE_QUANTITY,
                                    e.to_string(),
                                ),
                            )
                            .await;
                        }
                    }
                }
                CommittedStep::PointsRedeemed { user_id, points } => {
                    self.record(
                        saga_id,
                        saga,
                        SagaEvent::compensation_step_started(
                            order_fulfillment::COMP_RESTORE_REDEEMED_POINTS,
                        ),
                    )
                    .await;
                    match compensation::restore_redeemed_points(&self.accounts, user_id, *points)
                        .await
                    {
                        Ok(()) => {
                            metrics::counter!("compensation_steps_total").increment(1);
                            self.record(
                                saga_id,
                                saga,
                                SagaEvent::compensation_step_completed(
                                    order_fulfillment::COMP_RESTORE_REDEEMED_POINTS,
                                ),
                            )
                            .await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                %saga_id,
                                step = order_fulfillment::COMP_RESTORE_REDEEMED_POINTS,
                                error = %e,
                                "compensation step failed"
                            );
                            self.record(
                                saga_id,
                                saga,
                                SagaEvent::compensation_step_failed(
                                    order_fulfillment::COMP_RESTORE_REDEEMED_POINTS,
                                    e.to_string(),
                                ),
                            )
                            .await;
                        }
                    }
                }
            }
        }
    }

    /// Applies an event to the instance and persists the result.
    async fn record(&self, saga_id: SagaId, saga: &mut SagaInstance, event: SagaEvent) {
        saga.apply(event);
        self.sagas.write().await.insert(saga_id, saga.clone());
    }

    /// Removes and returns the saga behind a token. Tokens are consumed
    /// exactly once; a second signal lands on [`SagaError::UnknownToken`].
    async fn consume_token(&self, token: &ResumptionToken) -> Result<SagaId> {
        self.tokens
            .write()
            .await
            .remove(token)
            .ok_or(SagaError::UnknownToken(*token))
    }

    async fn load(&self, saga_id: SagaId) -> Result<SagaInstance> {
        self.sagas
            .read()
            .await
            .get(&saga_id)
            .cloned()
            .ok_or(SagaError::SagaNotFound(saga_id))
    }

    fn ensure_awaiting(&self, saga: &SagaInstance) -> Result<()> {
        if saga.state() != SagaState::AwaitingCourier {
            return Err(SagaError::InvalidState {
                expected: SagaState::AwaitingCourier.to_string(),
                actual: saga.state(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<I, A, B, Q> ResumptionSignal for SagaOrchestrator<I, A, B, Q>
where
    I: InventoryStore,
    A: AccountStore,
    B: BillingGateway,
    Q: FulfillmentQueue,
{
    async fn send_task_success(
        &self,
        token: ResumptionToken,
        courier: CourierAssignment,
    ) -> std::result::Result<(), FulfillmentError> {
        self.resume_success(token, courier)
            .await
            .map(|_| ())
            .map_err(signal_error)
    }

    async fn send_task_failure(
        &self,
        token: ResumptionToken,
        failure: TaskFailure,
    ) -> std::result::Result<(), FulfillmentError> {
        self.resume_failure(token, failure)
            .await
            .map(|_| ())
            .map_err(signal_error)
    }
}

fn signal_error(error: SagaError) -> FulfillmentError {
    match error {
        SagaError::UnknownToken(token) => FulfillmentError::UnknownToken(token),
        other => FulfillmentError::InvalidState(other.to_string()),
    }
}
