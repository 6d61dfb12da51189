//! Payment coordination layer
//!
//! Converts major-unit prices into provider minor units, attaches the
//! configured currency, and retries refunds on transient provider failures.

use std::sync::Arc;

use rust_decimal::Decimal;
use stay_common::PaymentConfig;
use stay_core::{to_minor_units, DomainError, PaymentGateway, PaymentIntent, RefundReceipt};
use tracing::{info, instrument, warn};

use super::retry::{retry_if, RetryPolicy};

pub struct PaymentCoordinator {
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    currency_exponent: u32,
    refund_policy: RetryPolicy,
}

impl PaymentCoordinator {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
        currency_exponent: u32,
        refund_policy: RetryPolicy,
    ) -> Self {
        Self {
            gateway,
            currency: currency.into(),
            currency_exponent,
            refund_policy,
        }
    }

    pub fn from_config(gateway: Arc<dyn PaymentGateway>, config: &PaymentConfig) -> Self {
        Self::new(
            gateway,
            config.currency.clone(),
            config.currency_exponent,
            RetryPolicy::from_config(config),
        )
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Create a payment intent for `amount` major units. Not retried.
    #[instrument(skip(self))]
    pub async fn create_intent(&self, amount: Decimal) -> Result<PaymentIntent, DomainError> {
        let amount_minor = self.minor_units(amount)?;
        let intent = self
            .gateway
            .create_intent(amount_minor, &self.currency)
            .await?;

        info!(intent_id = %intent.id, amount_minor, "Payment intent created");
        Ok(intent)
    }

    /// Refund `amount` major units against `intent_id`.
    ///
    /// Transient failures are retried with backoff; a rejection or an
    /// exhausted retry budget surfaces `DomainError::PaymentProvider`.
    #[instrument(skip(self))]
    pub async fn refund(&self, intent_id: &str, amount: Decimal) -> Result<RefundReceipt, DomainError> {
        let amount_minor = self.minor_units(amount)?;
        let gateway = &self.gateway;

        let receipt = retry_if(
            &self.refund_policy,
            stay_core::PaymentError::is_transient,
            || gateway.refund(intent_id, amount_minor),
        )
        .await
        .map_err(|e| {
            warn!(intent_id, error = %e, "Refund failed");
            DomainError::from(e)
        })?;

        info!(intent_id, refund_id = %receipt.id, amount_minor, "Refund completed");
        Ok(receipt)
    }

    fn minor_units(&self, amount: Decimal) -> Result<i64, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::ValidationError(format!(
                "amount must be positive: {amount}"
            )));
        }
        to_minor_units(amount, self.currency_exponent)
    }
}

impl std::fmt::Debug for PaymentCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCoordinator")
            .field("currency", &self.currency)
            .field("currency_exponent", &self.currency_exponent)
            .field("refund_policy", &self.refund_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPaymentGateway;
    use stay_core::PaymentError;
    use std::str::FromStr;

    fn coordinator(gateway: Arc<MockPaymentGateway>, retries: u32) -> PaymentCoordinator {
        PaymentCoordinator::new(gateway, "inr", 2, RetryPolicy::immediate(retries))
    }

    #[tokio::test]
    async fn test_intent_amount_is_rounded_half_up() {
        let gateway = Arc::new(MockPaymentGateway::new());
        let coordinator = coordinator(gateway.clone(), 3);

        let intent = coordinator
            .create_intent(Decimal::from_str("1500.505").unwrap())
            .await
            .unwrap();

        assert_eq!(intent.amount_minor, 150_051);
        assert_eq!(intent.currency, "inr");
        assert_eq!(gateway.intent_calls(), vec![150_051]);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let gateway = Arc::new(MockPaymentGateway::new());
        let coordinator = coordinator(gateway.clone(), 3);

        let err = coordinator.create_intent(Decimal::ZERO).await.unwrap_err();
        assert!(err.is_validation());
        assert!(gateway.intent_calls().is_empty());
    }

    #[tokio::test]
    async fn test_intent_failure_not_retried() {
        let gateway = Arc::new(MockPaymentGateway::new());
        gateway.push_intent_result(Err(PaymentError::Transient("503".to_string())));
        let coordinator = coordinator(gateway.clone(), 3);

        let err = coordinator.create_intent(Decimal::from(10)).await.unwrap_err();
        assert!(err.is_payment_provider());
        assert_eq!(gateway.intent_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_refund_retries_transient_failures() {
        let gateway = Arc::new(MockPaymentGateway::new());
        gateway.push_refund_result(Err(PaymentError::Transient("503".to_string())));
        gateway.push_refund_result(Err(PaymentError::Transient("timeout".to_string())));
        let coordinator = coordinator(gateway.clone(), 3);

        let receipt = coordinator.refund("pi_1", Decimal::from(200)).await.unwrap();
        assert_eq!(receipt.amount_minor, 20_000);
        assert_eq!(gateway.refund_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_refund_rejection_is_not_retried() {
        let gateway = Arc::new(MockPaymentGateway::new());
        gateway.push_refund_result(Err(PaymentError::Rejected("charge_disputed".to_string())));
        let coordinator = coordinator(gateway.clone(), 3);

        let err = coordinator.refund("pi_1", Decimal::from(200)).await.unwrap_err();
        assert!(err.is_payment_provider());
        assert_eq!(gateway.refund_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_refund_gives_up_after_budget() {
        let gateway = Arc::new(MockPaymentGateway::new());
        for _ in 0..5 {
            gateway.push_refund_result(Err(PaymentError::Transient("503".to_string())));
        }
        let coordinator = coordinator(gateway.clone(), 2);

        let err = coordinator.refund("pi_1", Decimal::from(200)).await.unwrap_err();
        assert!(err.is_payment_provider());
        assert_eq!(gateway.refund_calls().len(), 3);
    }
}
