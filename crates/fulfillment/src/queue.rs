//! Fulfillment queue trait and in-memory implementation.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{BookId, ResumptionToken};
use serde::{Deserialize, Serialize};

use crate::error::{FulfillmentError, Result};

/// The order data a fulfillment request carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentInput {
    /// The book to ship.
    pub book_id: BookId,
    /// Units to ship.
    pub quantity: u32,
}

/// A queued fulfillment request.
///
/// Wire format matches the observed queue message:
/// `{"Input": {"bookId": ..., "quantity": ...}, "Token": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FulfillmentRequest {
    /// The order being fulfilled.
    pub input: FulfillmentInput,
    /// Correlates this request back to the suspended saga.
    pub token: ResumptionToken,
}

impl FulfillmentRequest {
    /// Creates a new fulfillment request.
    pub fn new(book_id: impl Into<BookId>, quantity: u32, token: ResumptionToken) -> Self {
        Self {
            input: FulfillmentInput {
                book_id: book_id.into(),
                quantity,
            },
            token,
        }
    }
}

/// Trait for the durable fulfillment queue.
#[async_trait]
pub trait FulfillmentQueue: Send + Sync {
    /// Enqueues a fulfillment request.
    async fn enqueue(&self, request: &FulfillmentRequest) -> Result<()>;

    /// Dequeues the oldest pending request, if any.
    async fn dequeue(&self) -> Result<Option<FulfillmentRequest>>;
}

#[derive(Debug, Default)]
struct InMemoryQueueState {
    messages: VecDeque<String>,
    unavailable: bool,
}

/// In-memory fulfillment queue for testing.
///
/// Messages are held JSON-serialized so the wire format is exercised on
/// every enqueue/dequeue, same as a real queue backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFulfillmentQueue {
    state: Arc<RwLock<InMemoryQueueState>>,
}

impl InMemoryFulfillmentQueue {
    /// Creates a new empty in-memory queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pending messages.
    pub fn len(&self) -> usize {
        self.state.read().unwrap().messages.len()
    }

    /// Returns true if no messages are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulates a queue outage: enqueue and dequeue fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl FulfillmentQueue for InMemoryFulfillmentQueue {
    async fn enqueue(&self, request: &FulfillmentRequest) -> Result<()> {
        let body = serde_json::to_string(request)?;
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(FulfillmentError::QueueUnavailable(
                "fulfillment queue down".to_string(),
            ));
        }
        state.messages.push_back(body);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<FulfillmentRequest>> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(FulfillmentError::QueueUnavailable(
                "fulfillment queue down".to_string(),
            ));
        }
        match state.messages.pop_front() {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_dequeue_fifo() {
        let queue = InMemoryFulfillmentQueue::new();
        let r1 = FulfillmentRequest::new("book-1", 3, ResumptionToken::mint());
        let r2 = FulfillmentRequest::new("book-2", 1, ResumptionToken::mint());

        queue.enqueue(&r1).await.unwrap();
        queue.enqueue(&r2).await.unwrap();
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.dequeue().await.unwrap(), Some(r1));
        assert_eq!(queue.dequeue().await.unwrap(), Some(r2));
        assert_eq!(queue.dequeue().await.unwrap(), None);
    }

    #[test]
    fn test_wire_format_field_casing() {
        let token = ResumptionToken::mint();
        let request = FulfillmentRequest::new("book-1", 3, token);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["Input"]["bookId"], "book-1");
        assert_eq!(json["Input"]["quantity"], 3);
        assert_eq!(json["Token"], token.to_string());
    }

    #[tokio::test]
    async fn test_unavailable_queue() {
        let queue = InMemoryFulfillmentQueue::new();
        queue.set_unavailable(true);

        let request = FulfillmentRequest::new("book-1", 3, ResumptionToken::mint());
        assert!(matches!(
            queue.enqueue(&request).await,
            Err(FulfillmentError::QueueUnavailable(_))
        ));
        assert!(matches!(
            queue.dequeue().await,
            Err(FulfillmentError::QueueUnavailable(_))
        ));
    }
}
