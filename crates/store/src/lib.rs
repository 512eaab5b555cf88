//! Resource store clients for the order-fulfillment saga.
//!
//! Two logical key-value resources back the saga:
//! - inventory: `BookId -> { quantity, price }`
//! - accounts: `UserId -> { points }`
//!
//! Both support atomic per-key conditional updates only; there are no
//! multi-key transactions. The in-memory implementations mirror the
//! conditional-update semantics of the real backends so orchestration
//! code can be exercised without one.

pub mod account;
pub mod error;
pub mod inventory;
pub mod records;

pub use account::{AccountStore, InMemoryAccountStore};
pub use error::{Result, StoreError};
pub use inventory::{InMemoryInventoryStore, InventoryStore};
pub use records::{AccountRecord, InventoryRecord};
