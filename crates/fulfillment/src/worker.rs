//! Fulfillment worker: consumes the queue and signals suspended sagas.

use store::{InventoryStore, StoreError};

use crate::courier::CourierService;
use crate::error::Result;
use crate::queue::{FulfillmentQueue, FulfillmentRequest};
use crate::signal::{ResumptionSignal, TaskFailure, TaskFailureKind};

/// Consumes fulfillment requests out-of-band from the saga.
///
/// For each request the worker commits the inventory decrement that
/// CheckInventory only validated, assigns a courier, and signals the
/// suspended saga through the resumption contract. The window between
/// the saga's stock check and this commit is an accepted race; the
/// store's conditional update is what actually keeps quantity
/// non-negative.
pub struct FulfillmentWorker<Q, I, C, S>
where
    Q: FulfillmentQueue,
    I: InventoryStore,
    C: CourierService,
    S: ResumptionSignal,
{
    queue: Q,
    inventory: I,
    courier: C,
    signal: S,
}

impl<Q, I, C, S> FulfillmentWorker<Q, I, C, S>
where
    Q: FulfillmentQueue,
    I: InventoryStore,
    C: CourierService,
    S: ResumptionSignal,
{
    /// Creates a new fulfillment worker.
    pub fn new(queue: Q, inventory: I, courier: C, signal: S) -> Self {
        Self {
            queue,
            inventory,
            courier,
            signal,
        }
    }

    /// Processes at most one queued request.
    ///
    /// Returns `Ok(true)` if a request was processed, `Ok(false)` if the
    /// queue was empty. Task-level failures are reported to the saga via
    /// the failure signal, not as an error here; only infrastructure
    /// failures (queue, signal delivery) propagate.
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self) -> Result<bool> {
        let Some(request) = self.queue.dequeue().await? else {
            return Ok(false);
        };
        let FulfillmentRequest { input, token } = request;
        tracing::info!(
            book_id = %input.book_id,
            quantity = input.quantity,
            %token,
            "fulfillment request received"
        );

        match self
            .inventory
            .decrement_quantity(&input.book_id, input.quantity)
            .await
        {
            Ok(()) => match self.courier.assign(&input.book_id, input.quantity).await {
                Ok(assignment) => {
                    metrics::counter!("fulfillment_tasks_completed").increment(1);
                    tracing::info!(courier = %assignment.courier, %token, "courier assigned");
                    self.signal.send_task_success(token, assignment).await?;
                }
                Err(e) => {
                    // Decrement already committed; the saga must roll it back.
                    metrics::counter!("fulfillment_tasks_failed").increment(1);
                    tracing::warn!(%token, error = %e, "courier assignment failed");
                    self.signal
                        .send_task_failure(
                            token,
                            TaskFailure::new(
                                TaskFailureKind::NoCourierAvailable,
                                e.to_string(),
                                true,
                            ),
                        )
                        .await?;
                }
            },
            Err(e @ (StoreError::ConditionFailed { .. } | StoreError::NotFound { .. })) => {
                metrics::counter!("fulfillment_tasks_failed").increment(1);
                tracing::warn!(%token, error = %e, "commit-time decrement rejected");
                self.signal
                    .send_task_failure(
                        token,
                        TaskFailure::new(TaskFailureKind::OutOfStock, e.to_string(), false),
                    )
                    .await?;
            }
            Err(e) => {
                metrics::counter!("fulfillment_tasks_failed").increment(1);
                tracing::warn!(%token, error = %e, "inventory store unreachable");
                self.signal
                    .send_task_failure(
                        token,
                        TaskFailure::new(TaskFailureKind::StoreUnavailable, e.to_string(), false),
                    )
                    .await?;
            }
        }

        Ok(true)
    }

    /// Processes queued requests until the queue is empty.
    ///
    /// Returns the number of requests processed.
    pub async fn run_until_idle(&self) -> Result<usize> {
        let mut processed = 0;
        while self.run_once().await? {
            processed += 1;
        }
        Ok(processed)
    }
}
