//! Stripe REST implementation of the payment gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use stay_common::PaymentConfig;
use stay_core::{PaymentError, PaymentGateway, PaymentIntent, RefundReceipt};
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    client_secret: Option<String>,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RefundBody {
    id: String,
    amount: i64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Stripe client using form-encoded POSTs and a bearer secret key
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::Rejected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    pub fn from_config(config: &PaymentConfig) -> Result<Self, PaymentError> {
        Self::new(
            config.base_url.clone(),
            config.secret_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn post_form(
        &self,
        path: &str,
        idempotency_key: &str,
        form: &[(&str, String)],
    ) -> Result<Response, PaymentError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", idempotency_key)
            .form(form)
            .send()
            .await
            .map_err(|e| PaymentError::Transient(format!("request failed: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            status => Err(classify_failure(status, response).await),
        }
    }
}

/// 429 and 5xx are worth retrying; every other failure is a refusal
async fn classify_failure(status: StatusCode, response: Response) -> PaymentError {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error.code.or(e.error.message))
        .unwrap_or(body);
    let message = format!("{}: {detail}", status.as_u16());

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        PaymentError::Transient(message)
    } else {
        PaymentError::Rejected(message)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self))]
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let key = uuid::Uuid::new_v4().to_string();
        let form = [
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        let body: IntentBody = self
            .post_form("/v1/payment_intents", &key, &form)
            .await?
            .json()
            .await
            .map_err(|e| PaymentError::Rejected(format!("malformed intent response: {e}")))?;

        debug!(intent_id = %body.id, "Payment intent created");
        Ok(PaymentIntent {
            id: body.id,
            client_secret: body.client_secret,
            amount_minor: body.amount,
            currency: body.currency,
        })
    }

    #[instrument(skip(self))]
    async fn refund(&self, intent_id: &str, amount_minor: i64) -> Result<RefundReceipt, PaymentError> {
        // Same key on every retry so the provider refunds at most once
        let key = format!("refund-{intent_id}-{amount_minor}");
        let form = [
            ("payment_intent", intent_id.to_string()),
            ("amount", amount_minor.to_string()),
        ];
        let body: RefundBody = self
            .post_form("/v1/refunds", &key, &form)
            .await?
            .json()
            .await
            .map_err(|e| PaymentError::Transient(format!("malformed refund response: {e}")))?;

        debug!(refund_id = %body.id, status = %body.status, "Refund issued");
        Ok(RefundReceipt {
            id: body.id,
            amount_minor: body.amount,
            status: body.status,
        })
    }
}
