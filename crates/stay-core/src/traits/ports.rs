//! Collaborator ports - external systems the services talk to

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Actor;
use crate::error::DomainError;
use crate::events::DomainEvent;
use crate::value_objects::Snowflake;

// ============================================================================
// Payment Gateway
// ============================================================================

/// Failure reported by the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Network failure, timeout, rate limit or provider 5xx. Safe to retry.
    #[error("transient payment provider failure: {0}")]
    Transient(String),

    /// The provider refused the request. Retrying will not help.
    #[error("payment provider rejected the request: {0}")]
    Rejected(String),
}

impl PaymentError {
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::PaymentProvider(err.to_string())
    }
}

/// Payment intent created with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
}

/// Refund issued by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    pub id: String,
    pub amount_minor: i64,
    pub status: String,
}

/// Amounts are in minor units of `currency`
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError>;

    async fn refund(&self, intent_id: &str, amount_minor: i64) -> Result<RefundReceipt, PaymentError>;
}

// ============================================================================
// Media Storage
// ============================================================================

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store a blob and return the URL it is served from
    async fn upload(&self, bytes: &[u8], content_type: &str) -> Result<String, DomainError>;
}

// ============================================================================
// Notifier
// ============================================================================

/// Out-of-band notifications (email, push). Callers never fail on errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: Snowflake, subject: &str, body: &str) -> Result<(), DomainError>;
}

// ============================================================================
// Event Sink
// ============================================================================

/// Real-time delivery to a user's live connections
pub trait EventSink: Send + Sync {
    /// Returns the number of connections the event reached
    fn deliver(&self, user_id: Snowflake, event: &DomainEvent) -> usize;
}

// ============================================================================
// Token Verifier
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Turns a bearer token into a verified actor. Issuing tokens is external.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Actor, TokenError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_error_classification() {
        assert!(PaymentError::Transient("503".to_string()).is_transient());
        assert!(!PaymentError::Rejected("card_declined".to_string()).is_transient());

        let domain: DomainError = PaymentError::Rejected("charge_already_refunded".to_string()).into();
        assert!(domain.is_payment_provider());
    }
}
