//! Account store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;

use crate::error::{Result, StoreError};
use crate::records::AccountRecord;

/// Trait for the loyalty-point account store.
///
/// Point balances are written with unconditional sets, mirroring the
/// deduction policy of the redeem step: the whole balance is zeroed on
/// redemption and restored verbatim on compensation.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetches the account record for a user, if one exists.
    async fn get_account(&self, user_id: &UserId) -> Result<Option<AccountRecord>>;

    /// Unconditionally sets a user's point balance to zero.
    async fn zero_points(&self, user_id: &UserId) -> Result<()>;

    /// Sets a user's point balance. Compensation restore for a redemption.
    async fn set_points(&self, user_id: &UserId, points: u64) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryAccountState {
    records: HashMap<UserId, AccountRecord>,
    unavailable: bool,
}

/// In-memory account store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    state: Arc<RwLock<InMemoryAccountState>>,
}

impl InMemoryAccountStore {
    /// Creates a new empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn put(&self, record: AccountRecord) {
        let mut state = self.state.write().unwrap();
        state.records.insert(record.user_id.clone(), record);
    }

    /// Returns the current point balance for a user, if present.
    pub fn points_of(&self, user_id: &UserId) -> Option<u64> {
        self.state
            .read()
            .unwrap()
            .records
            .get(user_id)
            .map(|r| r.points)
    }

    /// Simulates a backend outage: every operation fails with
    /// [`StoreError::Unavailable`] until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_account(&self, user_id: &UserId) -> Result<Option<AccountRecord>> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("account store down".to_string()));
        }
        Ok(state.records.get(user_id).cloned())
    }

    async fn zero_points(&self, user_id: &UserId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("account store down".to_string()));
        }
        let record = state
            .records
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound {
                key: user_id.to_string(),
            })?;
        record.points = 0;
        Ok(())
    }

    async fn set_points(&self, user_id: &UserId, points: u64) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("account store down".to_string()));
        }
        let record = state
            .records
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound {
                key: user_id.to_string(),
            })?;
        record.points = points;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> InMemoryAccountStore {
        let store = InMemoryAccountStore::new();
        store.put(AccountRecord::new("user-1", 5000));
        store
    }

    #[tokio::test]
    async fn test_get_account() {
        let store = seeded_store();
        let record = store
            .get_account(&UserId::new("user-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.points, 5000);

        let missing = store.get_account(&UserId::new("user-9")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_zero_and_restore_points() {
        let store = seeded_store();
        let user = UserId::new("user-1");

        store.zero_points(&user).await.unwrap();
        assert_eq!(store.points_of(&user), Some(0));

        store.set_points(&user, 5000).await.unwrap();
        assert_eq!(store.points_of(&user), Some(5000));
    }

    #[tokio::test]
    async fn test_zero_points_missing_user() {
        let store = seeded_store();
        let result = store.zero_points(&UserId::new("user-9")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = seeded_store();
        store.set_unavailable(true);
        let user = UserId::new("user-1");

        assert!(store.get_account(&user).await.unwrap_err().is_unavailable());
        assert!(store.zero_points(&user).await.unwrap_err().is_unavailable());
        assert!(
            store
                .set_points(&user, 1)
                .await
                .unwrap_err()
                .is_unavailable()
        );
    }
}
