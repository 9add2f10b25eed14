//! Payment provider abstraction and its Stripe implementation

mod stripe;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::plan::BillingPlanKey;

pub use stripe::StripeClient;

#[derive(Error, Debug)]
pub enum PaymentProviderError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Request to payment provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
}

/// One subscription item of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionLineItem {
    pub price: String,
    /// Only set for licensed prices; metered prices are billed on usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub user_email: String,
    pub workspace_id: Uuid,
    pub line_items: Vec<SubscriptionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_id: Option<String>,
    pub plan: BillingPlanKey,
    pub require_payment_method: bool,
    /// Trial length, `None` when the workspace already had a subscription
    pub trial_period_days: Option<i64>,
}

/// A session created by the provider. `url` may be absent on some provider responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<ProviderSession, PaymentProviderError>;

    async fn create_billing_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<ProviderSession, PaymentProviderError>;
}
