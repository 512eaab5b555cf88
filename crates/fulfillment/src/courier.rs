//! Courier service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::BookId;

use crate::error::{FulfillmentError, Result};

/// Result of a successful courier assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierAssignment {
    /// The courier assigned to deliver the order.
    pub courier: String,
}

/// Trait for courier assignment operations.
#[async_trait]
pub trait CourierService: Send + Sync {
    /// Assigns a courier to deliver the given order.
    async fn assign(&self, book_id: &BookId, quantity: u32) -> Result<CourierAssignment>;
}

#[derive(Debug, Default)]
struct InMemoryCourierState {
    assignments: HashMap<String, (BookId, u32)>,
    next_id: u32,
    fail_on_assign: bool,
}

/// In-memory courier service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCourierService {
    state: Arc<RwLock<InMemoryCourierState>>,
}

impl InMemoryCourierService {
    /// Creates a new in-memory courier service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on the next assign call.
    pub fn set_fail_on_assign(&self, fail: bool) {
        self.state.write().unwrap().fail_on_assign = fail;
    }

    /// Returns the number of active assignments.
    pub fn assignment_count(&self) -> usize {
        self.state.read().unwrap().assignments.len()
    }

    /// Returns true if a courier with the given name has an assignment.
    pub fn has_assignment(&self, courier: &str) -> bool {
        self.state.read().unwrap().assignments.contains_key(courier)
    }
}

#[async_trait]
impl CourierService for InMemoryCourierService {
    async fn assign(&self, book_id: &BookId, quantity: u32) -> Result<CourierAssignment> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_assign {
            return Err(FulfillmentError::NoCourierAvailable(
                "all couriers busy".to_string(),
            ));
        }

        state.next_id += 1;
        let courier = format!("COURIER-{:04}", state.next_id);
        state
            .assignments
            .insert(courier.clone(), (book_id.clone(), quantity));

        Ok(CourierAssignment { courier })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_assign() {
        let service = InMemoryCourierService::new();
        let result = service.assign(&BookId::new("book-1"), 3).await.unwrap();

        assert!(result.courier.starts_with("COURIER-"));
        assert_eq!(service.assignment_count(), 1);
        assert!(service.has_assignment(&result.courier));
    }

    #[tokio::test]
    async fn test_fail_on_assign() {
        let service = InMemoryCourierService::new();
        service.set_fail_on_assign(true);

        let result = service.assign(&BookId::new("book-1"), 3).await;
        assert!(matches!(
            result,
            Err(FulfillmentError::NoCourierAvailable(_))
        ));
        assert_eq!(service.assignment_count(), 0);
    }

    #[tokio::test]
    async fn test_sequential_courier_names() {
        let service = InMemoryCourierService::new();
        let book = BookId::new("book-1");

        let r1 = service.assign(&book, 1).await.unwrap();
        let r2 = service.assign(&book, 2).await.unwrap();

        assert_eq!(r1.courier, "COURIER-0001");
        assert_eq!(r2.courier, "COURIER-0002");
    }
}
