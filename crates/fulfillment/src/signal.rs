//! The resumption contract between the worker and the orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use common::ResumptionToken;
use serde::{Deserialize, Serialize};

use crate::courier::CourierAssignment;
use crate::error::Result;

/// Closed set of failure kinds a fulfillment task can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskFailureKind {
    /// No courier could be assigned.
    NoCourierAvailable,
    /// The commit-time decrement found insufficient stock.
    OutOfStock,
    /// The inventory store could not be reached.
    StoreUnavailable,
}

/// Failure payload for [`ResumptionSignal::send_task_failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// What went wrong.
    pub kind: TaskFailureKind,
    /// Human-readable cause.
    pub cause: String,
    /// Whether the inventory decrement had already committed when the
    /// task failed. Decides if the quantity must be rolled back.
    pub decrement_committed: bool,
}

impl TaskFailure {
    /// Creates a new task failure payload.
    pub fn new(kind: TaskFailureKind, cause: impl Into<String>, decrement_committed: bool) -> Self {
        Self {
            kind,
            cause: cause.into(),
            decrement_committed,
        }
    }
}

/// Signals a suspended saga with the outcome of its fulfillment task.
///
/// The token correlates the signal back to the orchestrator invocation
/// awaiting it; each token is valid for exactly one signal.
#[async_trait]
pub trait ResumptionSignal: Send + Sync {
    /// Resumes the saga behind `token` with a successful courier assignment.
    async fn send_task_success(
        &self,
        token: ResumptionToken,
        courier: CourierAssignment,
    ) -> Result<()>;

    /// Resumes the saga behind `token` into compensation.
    async fn send_task_failure(&self, token: ResumptionToken, failure: TaskFailure) -> Result<()>;
}

#[async_trait]
impl<T: ResumptionSignal + ?Sized> ResumptionSignal for Arc<T> {
    async fn send_task_success(
        &self,
        token: ResumptionToken,
        courier: CourierAssignment,
    ) -> Result<()> {
        (**self).send_task_success(token, courier).await
    }

    async fn send_task_failure(&self, token: ResumptionToken, failure: TaskFailure) -> Result<()> {
        (**self).send_task_failure(token, failure).await
    }
}
