//! Saga pattern implementation for order fulfillment.
//!
//! This crate orchestrates a multi-step distributed transaction with
//! compensating actions on failure. The order fulfillment saga runs:
//!
//! 1. CheckInventory — validate stock, no mutation
//! 2. CalculateTotal — price the order
//! 3. RedeemPoints — zero the account's loyalty points (commit point)
//! 4. BillCustomer — charge the customer
//! 5. AssignCourier — asynchronous: the saga suspends on a fulfillment
//!    queue and an out-of-band worker commits the inventory decrement,
//!    assigns a courier, and signals the saga back via resumption token
//!
//! If any step fails after a committed side effect, the committed steps
//! are compensated in reverse order (restore inventory quantity, restore
//! redeemed points) before the saga reports the originating error.

pub mod compensation;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod instance;
pub mod orchestrator;
pub mod order_fulfillment;
pub mod services;
pub mod state;
pub mod steps;

pub use config::SagaConfig;
pub use context::{OrderContext, OrderRequest, Redemption};
pub use error::SagaError;
pub use events::{SagaEvent, StepOutput};
pub use instance::{CommittedStep, SagaInstance};
pub use orchestrator::{SagaHandle, SagaOrchestrator};
pub use services::{
    BillingConfirmation, BillingGateway, BillingRequest, InMemoryBillingGateway,
};
pub use state::SagaState;
