//! Compensation definitions: inverse operations for committed steps.
//!
//! Only the steps that mutate shared state have compensations. The
//! orchestrator runs them best-effort, in strict reverse order of
//! commitment: a compensation failure is logged and recorded as a
//! secondary diagnostic, never rethrown, so it cannot block
//! compensation of earlier steps.

use common::{BookId, UserId};
use store::{AccountStore, InventoryStore};

use crate::error::Result;

/// RestoreRedeemPoints: undo a points redemption.
///
/// No-op when no points were deducted; otherwise sets the balance back
/// to its pre-redemption value.
pub async fn restore_redeemed_points<A: AccountStore>(
    accounts: &A,
    user_id: &UserId,
    points: u64,
) -> Result<()> {
    if points == 0 {
        return Ok(());
    }
    accounts.set_points(user_id, points).await?;
    Ok(())
}

/// RestoreQuantity: undo a committed inventory decrement.
///
/// The increment is not idempotent at the store, so the orchestrator
/// invokes this at most once per committed decrement.
pub async fn restore_quantity<I: InventoryStore>(
    inventory: &I,
    book_id: &BookId,
    quantity: u32,
) -> Result<()> {
    inventory.increment_quantity(book_id, quantity).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::redeem_points;
    use common::Money;
    use store::{AccountRecord, InMemoryAccountStore, InMemoryInventoryStore, InventoryRecord};

    #[tokio::test]
    async fn test_restore_redeemed_points() {
        let accounts = InMemoryAccountStore::new();
        accounts.put(AccountRecord::new("user-1", 0));

        restore_redeemed_points(&accounts, &"user-1".into(), 5000)
            .await
            .unwrap();
        assert_eq!(accounts.points_of(&"user-1".into()), Some(5000));
    }

    #[tokio::test]
    async fn test_restore_zero_points_is_a_noop() {
        let accounts = InMemoryAccountStore::new();
        // No account seeded: a zero-point restore must not even hit the store.
        restore_redeemed_points(&accounts, &"user-9".into(), 0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_restore_quantity() {
        let inventory = InMemoryInventoryStore::new();
        inventory.put(InventoryRecord::new("book-1", 7, Money::from_dollars(20)));

        restore_quantity(&inventory, &"book-1".into(), 3)
            .await
            .unwrap();
        assert_eq!(inventory.quantity_of(&"book-1".into()), Some(10));
    }

    #[tokio::test]
    async fn test_restore_then_redeem_round_trips_the_account() {
        let accounts = InMemoryAccountStore::new();
        accounts.put(AccountRecord::new("user-1", 5000));
        let total = Money::from_dollars(60);

        let redemption = redeem_points(&accounts, &"user-1".into(), total)
            .await
            .unwrap();
        restore_redeemed_points(&accounts, &"user-1".into(), redemption.points)
            .await
            .unwrap();

        // Back to the pre-saga balance; a fresh redemption sees the same state.
        assert_eq!(accounts.points_of(&"user-1".into()), Some(5000));
        let again = redeem_points(&accounts, &"user-1".into(), total)
            .await
            .unwrap();
        assert_eq!(again, redemption);
    }
}
