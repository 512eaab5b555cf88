//! Asynchronous fulfillment gateway for the order-fulfillment saga.
//!
//! Bridges the synchronous saga to an out-of-band worker: the
//! orchestrator enqueues a fulfillment request carrying a resumption
//! token and suspends; the [`FulfillmentWorker`] consumes the queue,
//! commits the inventory decrement, assigns a courier, and signals the
//! suspended saga back through the [`ResumptionSignal`] contract.

pub mod courier;
pub mod error;
pub mod queue;
pub mod signal;
pub mod worker;

pub use courier::{CourierAssignment, CourierService, InMemoryCourierService};
pub use error::{FulfillmentError, Result};
pub use queue::{FulfillmentInput, FulfillmentQueue, FulfillmentRequest, InMemoryFulfillmentQueue};
pub use signal::{ResumptionSignal, TaskFailure, TaskFailureKind};
pub use worker::FulfillmentWorker;
