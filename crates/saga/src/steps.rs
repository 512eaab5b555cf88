//! Step definitions for the order-fulfillment saga.
//!
//! Each step takes prior step outputs plus the store handles it needs,
//! and returns its output or a [`SagaError`]. Steps are pure with
//! respect to orchestration: which of them run, and in what order, is
//! decided entirely by the orchestrator.

use common::{BookId, Money, UserId};
use store::{AccountStore, InventoryRecord, InventoryStore};

use crate::context::Redemption;
use crate::error::{Result, SagaError};
use crate::services::billing::{BillingGateway, BillingRequest};

/// CheckInventory: validate that stock covers the order.
///
/// Validation only — the record is returned unchanged and nothing is
/// mutated; the decrement commits at fulfillment time. Idempotent and
/// safe to retry.
///
/// `allow_exact_depletion` selects the boundary behavior: whether an
/// order that brings stock to exactly zero is accepted.
pub async fn check_inventory<I: InventoryStore>(
    inventory: &I,
    book_id: &BookId,
    quantity: u32,
    allow_exact_depletion: bool,
) -> Result<InventoryRecord> {
    if quantity == 0 {
        return Err(SagaError::InvalidInput(
            "order quantity must be positive".to_string(),
        ));
    }

    let record = inventory
        .get_inventory(book_id)
        .await?
        .ok_or_else(|| SagaError::BookNotFound(book_id.clone()))?;

    let available = if allow_exact_depletion {
        record.quantity >= quantity
    } else {
        record.quantity > quantity
    };
    if !available {
        return Err(SagaError::BookOutOfStock(book_id.clone()));
    }

    Ok(record)
}

/// CalculateTotal: price the order.
///
/// Pure function of the checked record and the ordered quantity.
pub fn calculate_total(book: &InventoryRecord, quantity: u32) -> Result<Money> {
    if quantity == 0 {
        return Err(SagaError::InvalidInput(
            "order quantity must be positive".to_string(),
        ));
    }
    if book.price.is_negative() {
        return Err(SagaError::InvalidInput(format!(
            "book {} has a negative price",
            book.book_id
        )));
    }
    Ok(book.price.multiply(quantity))
}

/// RedeemPoints: deduct the user's full point balance from the total.
///
/// Eligibility is `total > points`: redemption applies only when the
/// order total strictly exceeds the available balance, and then the
/// whole balance is deducted rather than just enough to cover the
/// total. An order the balance could cover outright is rejected with
/// [`SagaError::InsufficientOrderTotal`], leaving the account
/// untouched. Zeroing the account is the saga's first commit point,
/// compensated by [`crate::compensation::restore_redeemed_points`].
pub async fn redeem_points<A: AccountStore>(
    accounts: &A,
    user_id: &UserId,
    total: Money,
) -> Result<Redemption> {
    let account = accounts
        .get_account(user_id)
        .await?
        .ok_or_else(|| SagaError::AccountNotFound(user_id.clone()))?;

    let balance = Money::from_points(account.points);
    if total > balance {
        accounts.zero_points(user_id).await?;
        Ok(Redemption {
            total: total - balance,
            points: account.points,
        })
    } else {
        Err(SagaError::InsufficientOrderTotal {
            total,
            points: account.points,
        })
    }
}

/// BillCustomer: charge the customer the remaining total.
///
/// Delegates to the external gateway; there is no reversal operation,
/// so a saga failing after a successful charge leaves it in place.
pub async fn bill_customer<B: BillingGateway>(
    billing: &B,
    user_id: &UserId,
    amount: Money,
) -> Result<String> {
    let confirmation = billing
        .bill(BillingRequest {
            user_id: user_id.clone(),
            amount,
        })
        .await?;
    Ok(confirmation.confirmation_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{AccountRecord, InMemoryAccountStore, InMemoryInventoryStore};

    fn seeded_inventory() -> InMemoryInventoryStore {
        let store = InMemoryInventoryStore::new();
        store.put(InventoryRecord::new("book-1", 10, Money::from_dollars(20)));
        store
    }

    #[tokio::test]
    async fn test_check_inventory_success_returns_record_unchanged() {
        let inventory = seeded_inventory();
        let book = check_inventory(&inventory, &"book-1".into(), 3, false)
            .await
            .unwrap();

        assert_eq!(book.quantity, 10);
        assert_eq!(book.price, Money::from_dollars(20));
        // Validation only: the store record is untouched.
        assert_eq!(inventory.quantity_of(&"book-1".into()), Some(10));
    }

    #[tokio::test]
    async fn test_check_inventory_out_of_stock() {
        let inventory = seeded_inventory();
        let result = check_inventory(&inventory, &"book-1".into(), 11, false).await;
        assert!(matches!(result, Err(SagaError::BookOutOfStock(_))));
    }

    #[tokio::test]
    async fn test_check_inventory_exact_depletion_policy() {
        let inventory = seeded_inventory();

        // Default policy: an order that exhausts stock exactly is rejected.
        let strict = check_inventory(&inventory, &"book-1".into(), 10, false).await;
        assert!(matches!(strict, Err(SagaError::BookOutOfStock(_))));

        // Relaxed policy accepts it.
        let relaxed = check_inventory(&inventory, &"book-1".into(), 10, true).await;
        assert!(relaxed.is_ok());
    }

    #[tokio::test]
    async fn test_check_inventory_book_not_found() {
        let inventory = seeded_inventory();
        let result = check_inventory(&inventory, &"book-9".into(), 1, false).await;
        assert!(matches!(result, Err(SagaError::BookNotFound(_))));
    }

    #[tokio::test]
    async fn test_check_inventory_zero_quantity() {
        let inventory = seeded_inventory();
        let result = check_inventory(&inventory, &"book-1".into(), 0, false).await;
        assert!(matches!(result, Err(SagaError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_check_inventory_store_outage() {
        let inventory = seeded_inventory();
        inventory.set_unavailable(true);
        let result = check_inventory(&inventory, &"book-1".into(), 3, false).await;
        assert!(matches!(result, Err(SagaError::StoreUnavailable(_))));
    }

    #[test]
    fn test_calculate_total_is_price_times_quantity() {
        let book = InventoryRecord::new("book-1", 10, Money::from_dollars(20));
        assert_eq!(calculate_total(&book, 3).unwrap(), Money::from_dollars(60));
        assert_eq!(calculate_total(&book, 1).unwrap(), Money::from_dollars(20));
    }

    #[test]
    fn test_calculate_total_rejects_malformed_input() {
        let book = InventoryRecord::new("book-1", 10, Money::from_dollars(20));
        assert!(matches!(
            calculate_total(&book, 0),
            Err(SagaError::InvalidInput(_))
        ));

        let bad = InventoryRecord::new("book-1", 10, Money::from_cents(-1));
        assert!(matches!(
            calculate_total(&bad, 2),
            Err(SagaError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_redeem_points_deducts_full_balance() {
        let accounts = InMemoryAccountStore::new();
        accounts.put(AccountRecord::new("user-1", 5000));

        let redemption = redeem_points(&accounts, &"user-1".into(), Money::from_dollars(60))
            .await
            .unwrap();

        assert_eq!(redemption.points, 5000);
        assert_eq!(redemption.total, Money::from_cents(1000));
        assert_eq!(accounts.points_of(&"user-1".into()), Some(0));
    }

    #[tokio::test]
    async fn test_redeem_points_rejected_when_balance_covers_total() {
        let accounts = InMemoryAccountStore::new();
        accounts.put(AccountRecord::new("user-1", 10_000));

        let result = redeem_points(&accounts, &"user-1".into(), Money::from_dollars(60)).await;

        assert!(matches!(
            result,
            Err(SagaError::InsufficientOrderTotal { points: 10_000, .. })
        ));
        // Account untouched on rejection.
        assert_eq!(accounts.points_of(&"user-1".into()), Some(10_000));
    }

    #[tokio::test]
    async fn test_redeem_points_rejected_on_exact_balance() {
        let accounts = InMemoryAccountStore::new();
        accounts.put(AccountRecord::new("user-1", 6000));

        // total == points is not "total exceeds points".
        let result = redeem_points(&accounts, &"user-1".into(), Money::from_dollars(60)).await;
        assert!(matches!(
            result,
            Err(SagaError::InsufficientOrderTotal { .. })
        ));
    }

    #[tokio::test]
    async fn test_redeem_points_missing_account() {
        let accounts = InMemoryAccountStore::new();
        let result = redeem_points(&accounts, &"user-9".into(), Money::from_dollars(60)).await;
        assert!(matches!(result, Err(SagaError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_bill_customer() {
        use crate::services::billing::InMemoryBillingGateway;

        let billing = InMemoryBillingGateway::new();
        let confirmation = bill_customer(&billing, &"user-1".into(), Money::from_cents(1000))
            .await
            .unwrap();

        assert!(confirmation.starts_with("BILL-"));
        assert_eq!(billing.charge_count(), 1);
    }
}
