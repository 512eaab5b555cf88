//! External service traits and in-memory implementations for saga steps.

pub mod billing;

pub use billing::{BillingConfirmation, BillingGateway, BillingRequest, InMemoryBillingGateway};
