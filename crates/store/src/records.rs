//! Records owned by the resource stores.

use common::{BookId, Money, UserId};
use serde::{Deserialize, Serialize};

/// A book's stock level and unit price, keyed by [`BookId`].
///
/// Mutated only through conditional decrement/increment; the committed
/// quantity never goes negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// The book this record describes.
    pub book_id: BookId,

    /// Units in stock.
    pub quantity: u32,

    /// Price per unit.
    pub price: Money,
}

impl InventoryRecord {
    /// Creates a new inventory record.
    pub fn new(book_id: impl Into<BookId>, quantity: u32, price: Money) -> Self {
        Self {
            book_id: book_id.into(),
            quantity,
            price,
        }
    }
}

/// A user's loyalty-point balance, keyed by [`UserId`].
///
/// Mutated only through the redeem/restore pair; points never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// The account owner.
    pub user_id: UserId,

    /// Available loyalty points.
    pub points: u64,
}

impl AccountRecord {
    /// Creates a new account record.
    pub fn new(user_id: impl Into<UserId>, points: u64) -> Self {
        Self {
            user_id: user_id.into(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_record_serialization() {
        let record = InventoryRecord::new("book-1", 10, Money::from_dollars(20));
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: InventoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
        assert!(json.contains("bookId"));
    }

    #[test]
    fn test_account_record_serialization() {
        let record = AccountRecord::new("user-1", 5000);
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: AccountRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
        assert!(json.contains("userId"));
    }
}
