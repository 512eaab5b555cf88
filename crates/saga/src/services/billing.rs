//! Billing gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, UserId};

use crate::error::{Result, SagaError};

/// Payload for a billing charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingRequest {
    /// The customer to charge.
    pub user_id: UserId,
    /// Amount to charge, after any point redemption.
    pub amount: Money,
}

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingConfirmation {
    /// The confirmation ID assigned by the gateway.
    pub confirmation_id: String,
}

/// Trait for the external payment gateway.
///
/// There is no reversal operation: once a charge succeeds it stays in
/// place even if the saga later fails and compensates its other steps.
#[async_trait]
pub trait BillingGateway: Send + Sync {
    /// Charges a customer.
    async fn bill(&self, request: BillingRequest) -> Result<BillingConfirmation>;
}

#[derive(Debug, Default)]
struct InMemoryBillingState {
    charges: HashMap<String, BillingRequest>,
    next_id: u32,
    decline_next: bool,
    unavailable: bool,
}

/// In-memory billing gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingGateway {
    state: Arc<RwLock<InMemoryBillingState>>,
}

impl InMemoryBillingGateway {
    /// Creates a new in-memory billing gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline the next charge.
    pub fn set_decline(&self, decline: bool) {
        self.state.write().unwrap().decline_next = decline;
    }

    /// Simulates a gateway outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Returns the number of successful charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Returns true if a charge exists with the given confirmation ID.
    pub fn has_charge(&self, confirmation_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .charges
            .contains_key(confirmation_id)
    }
}

#[async_trait]
impl BillingGateway for InMemoryBillingGateway {
    async fn bill(&self, request: BillingRequest) -> Result<BillingConfirmation> {
        let mut state = self.state.write().unwrap();

        if state.unavailable {
            return Err(SagaError::GatewayUnavailable(
                "billing gateway down".to_string(),
            ));
        }
        if state.decline_next {
            return Err(SagaError::PaymentDeclined("card declined".to_string()));
        }

        state.next_id += 1;
        let confirmation_id = format!("BILL-{:04}", state.next_id);
        state.charges.insert(confirmation_id.clone(), request);

        Ok(BillingConfirmation { confirmation_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BillingRequest {
        BillingRequest {
            user_id: UserId::new("user-1"),
            amount: Money::from_cents(1000),
        }
    }

    #[tokio::test]
    async fn test_bill() {
        let gateway = InMemoryBillingGateway::new();
        let result = gateway.bill(request()).await.unwrap();

        assert!(result.confirmation_id.starts_with("BILL-"));
        assert_eq!(gateway.charge_count(), 1);
        assert!(gateway.has_charge(&result.confirmation_id));
    }

    #[tokio::test]
    async fn test_decline() {
        let gateway = InMemoryBillingGateway::new();
        gateway.set_decline(true);

        let result = gateway.bill(request()).await;
        assert!(matches!(result, Err(SagaError::PaymentDeclined(_))));
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let gateway = InMemoryBillingGateway::new();
        gateway.set_unavailable(true);

        let result = gateway.bill(request()).await;
        assert!(matches!(result, Err(SagaError::GatewayUnavailable(_))));
    }

    #[tokio::test]
    async fn test_sequential_confirmation_ids() {
        let gateway = InMemoryBillingGateway::new();

        let r1 = gateway.bill(request()).await.unwrap();
        let r2 = gateway.bill(request()).await.unwrap();

        assert_eq!(r1.confirmation_id, "BILL-0001");
        assert_eq!(r2.confirmation_id, "BILL-0002");
    }
}
