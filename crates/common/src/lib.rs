//! Shared value types for the order-fulfillment saga.
//!
//! Identifier newtypes and the `Money` amount type used across the
//! store, fulfillment, and saga crates.

pub mod ids;
pub mod money;

pub use ids::{BookId, ResumptionToken, SagaId, UserId};
pub use money::Money;
