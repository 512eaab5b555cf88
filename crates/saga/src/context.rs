//! Saga-scoped order context.

use common::{BookId, Money, UserId};
use serde::{Deserialize, Serialize};
use store::InventoryRecord;

/// An order submitted for fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// The book being ordered.
    pub book_id: BookId,

    /// Units ordered.
    pub quantity: u32,

    /// The ordering user.
    pub user_id: UserId,
}

impl OrderRequest {
    /// Creates a new order request.
    pub fn new(book_id: impl Into<BookId>, quantity: u32, user_id: impl Into<UserId>) -> Self {
        Self {
            book_id: book_id.into(),
            quantity,
            user_id: user_id.into(),
        }
    }
}

/// Outcome of the RedeemPoints step, kept for compensation bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    /// Order total remaining after the redemption.
    pub total: Money,

    /// Points deducted from the account.
    pub points: u64,
}

/// Ephemeral aggregate accumulated step by step over one saga run.
///
/// Created at saga start and discarded at saga end; it has no identity
/// beyond the saga's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContext {
    /// The book being ordered.
    pub book_id: BookId,

    /// Units ordered.
    pub quantity: u32,

    /// The ordering user.
    pub user_id: UserId,

    /// Inventory record fetched by CheckInventory.
    pub book: Option<InventoryRecord>,

    /// Order total from CalculateTotal.
    pub total: Option<Money>,

    /// Redemption outcome from RedeemPoints.
    pub redeemed: Option<Redemption>,

    /// Billing confirmation from BillCustomer.
    pub billing: Option<String>,

    /// Courier assigned during fulfillment.
    pub courier: Option<String>,
}

impl OrderContext {
    /// Creates a fresh context for an order.
    pub fn new(order: &OrderRequest) -> Self {
        Self {
            book_id: order.book_id.clone(),
            quantity: order.quantity,
            user_id: order.user_id.clone(),
            book: None,
            total: None,
            redeemed: None,
            billing: None,
            courier: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_carries_order_fields_only() {
        let order = OrderRequest::new("book-1", 3, "user-1");
        let context = OrderContext::new(&order);

        assert_eq!(context.book_id, order.book_id);
        assert_eq!(context.quantity, 3);
        assert_eq!(context.user_id, order.user_id);
        assert!(context.book.is_none());
        assert!(context.total.is_none());
        assert!(context.redeemed.is_none());
        assert!(context.billing.is_none());
        assert!(context.courier.is_none());
    }

    #[test]
    fn test_order_request_serialization() {
        let order = OrderRequest::new("book-1", 3, "user-1");
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: OrderRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
        assert!(json.contains("bookId"));
        assert!(json.contains("userId"));
    }
}
