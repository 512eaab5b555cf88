//! Inventory store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::BookId;

use crate::error::{Result, StoreError};
use crate::records::InventoryRecord;

/// Trait for the inventory resource store.
///
/// Quantity changes are single conditional updates: a decrement applies
/// only if the remaining stock covers it, so committed quantity can never
/// be observed below zero even when concurrent sagas race on one key.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fetches the inventory record for a book, if one exists.
    async fn get_inventory(&self, book_id: &BookId) -> Result<Option<InventoryRecord>>;

    /// Decrements a book's quantity by `qty` as a single conditional update.
    ///
    /// Fails with [`StoreError::ConditionFailed`] when the stock on hand
    /// does not cover the decrement. Sufficiency is still checked by the
    /// caller first; this guard exists for the window between check and
    /// commit.
    async fn decrement_quantity(&self, book_id: &BookId, qty: u32) -> Result<()>;

    /// Increments a book's quantity by `qty`.
    ///
    /// Compensation for a committed decrement. The store does not make
    /// this idempotent, so callers invoke it at most once per committed
    /// decrement.
    async fn increment_quantity(&self, book_id: &BookId, qty: u32) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    records: HashMap<BookId, InventoryRecord>,
    unavailable: bool,
}

/// In-memory inventory store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory inventory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn put(&self, record: InventoryRecord) {
        let mut state = self.state.write().unwrap();
        state.records.insert(record.book_id.clone(), record);
    }

    /// Returns the current quantity for a book, if present.
    pub fn quantity_of(&self, book_id: &BookId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .records
            .get(book_id)
            .map(|r| r.quantity)
    }

    /// Simulates a backend outage: every operation fails with
    /// [`StoreError::Unavailable`] until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get_inventory(&self, book_id: &BookId) -> Result<Option<InventoryRecord>> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store down".to_string()));
        }
        Ok(state.records.get(book_id).cloned())
    }

    async fn decrement_quantity(&self, book_id: &BookId, qty: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store down".to_string()));
        }
        let record = state
            .records
            .get_mut(book_id)
            .ok_or_else(|| StoreError::NotFound {
                key: book_id.to_string(),
            })?;
        if record.quantity < qty {
            return Err(StoreError::ConditionFailed {
                key: book_id.to_string(),
            });
        }
        record.quantity -= qty;
        Ok(())
    }

    async fn increment_quantity(&self, book_id: &BookId, qty: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store down".to_string()));
        }
        let record = state
            .records
            .get_mut(book_id)
            .ok_or_else(|| StoreError::NotFound {
                key: book_id.to_string(),
            })?;
        record.quantity += qty;
        Ok(())
    }
}
