//! Stripe REST client
//!
//! Stripe takes form encoded bodies with bracketed keys for nested parameters and
//! authenticates with the secret key as a bearer token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{CheckoutSessionRequest, PaymentProvider, PaymentProviderError, ProviderSession};

const STRIPE_API_BASE: &str = "https://api.stripe.com";

pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, PaymentProviderError> {
        Self::with_base_url(api_key, STRIPE_API_BASE)
    }

    /// Client against another API host, such as a local mock.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, PaymentProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<ProviderSession, PaymentProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Stripe POST {}", path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(PaymentProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        Ok(ProviderSession {
            id: session.id,
            url: session.url,
        })
    }
}

/// Form fields of a subscription checkout session.
pub(crate) fn checkout_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let workspace_id = request.workspace_id.to_string();
    let mut form = vec![
        ("mode".to_string(), "subscription".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("client_reference_id".to_string(), workspace_id.clone()),
        ("metadata[workspaceId]".to_string(), workspace_id.clone()),
        ("metadata[plan]".to_string(), request.plan.as_str().to_string()),
        ("subscription_data[metadata][workspaceId]".to_string(), workspace_id),
        (
            "subscription_data[metadata][plan]".to_string(),
            request.plan.as_str().to_string(),
        ),
        (
            "payment_method_collection".to_string(),
            if request.require_payment_method { "always" } else { "if_required" }.to_string(),
        ),
    ];

    for (index, item) in request.line_items.iter().enumerate() {
        form.push((format!("line_items[{}][price]", index), item.price.clone()));
        if let Some(quantity) = item.quantity {
            form.push((format!("line_items[{}][quantity]", index), quantity.to_string()));
        }
    }

    match &request.customer_id {
        Some(customer_id) => form.push(("customer".to_string(), customer_id.clone())),
        None => form.push(("customer_email".to_string(), request.user_email.clone())),
    }

    if let Some(days) = request.trial_period_days {
        form.push((
            "subscription_data[trial_period_days]".to_string(),
            days.to_string(),
        ));
        if !request.require_payment_method {
            form.push((
                "subscription_data[trial_settings][end_behavior][missing_payment_method]"
                    .to_string(),
                "pause".to_string(),
            ));
        }
    }

    form
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<ProviderSession, PaymentProviderError> {
        let session = self
            .post_form("/v1/checkout/sessions", &checkout_form(&request))
            .await?;
        info!("Created Stripe checkout session {} for workspace {}", session.id, request.workspace_id);
        Ok(session)
    }

    async fn create_billing_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<ProviderSession, PaymentProviderError> {
        let form = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];
        let session = self.post_form("/v1/billing_portal/sessions", &form).await?;
        info!("Created Stripe billing portal session {}", session.id);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::BillingPlanKey;
    use crate::provider::SubscriptionLineItem;
    use uuid::Uuid;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checkout_request(customer_id: Option<&str>, trial: Option<i64>) -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            user_email: "jane@acme.dev".to_string(),
            workspace_id: Uuid::nil(),
            line_items: vec![
                SubscriptionLineItem {
                    price: "price_base".to_string(),
                    quantity: Some(3),
                },
                SubscriptionLineItem {
                    price: "price_metered".to_string(),
                    quantity: None,
                },
            ],
            success_url: "https://acme.atrium.dev/settings/billing".to_string(),
            cancel_url: "https://acme.atrium.dev/".to_string(),
            customer_id: customer_id.map(str::to_string),
            plan: BillingPlanKey::Pro,
            require_payment_method: false,
            trial_period_days: trial,
        }
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_checkout_form_for_new_customer_with_trial() {
        let form = checkout_form(&checkout_request(None, Some(7)));

        assert_eq!(field(&form, "mode"), Some("subscription"));
        assert_eq!(field(&form, "line_items[0][price]"), Some("price_base"));
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("3"));
        assert_eq!(field(&form, "line_items[1][price]"), Some("price_metered"));
        assert_eq!(field(&form, "line_items[1][quantity]"), None);
        assert_eq!(field(&form, "customer_email"), Some("jane@acme.dev"));
        assert_eq!(field(&form, "customer"), None);
        assert_eq!(field(&form, "subscription_data[trial_period_days]"), Some("7"));
        assert_eq!(field(&form, "payment_method_collection"), Some("if_required"));
        assert_eq!(field(&form, "metadata[plan]"), Some("PRO"));
    }

    #[test]
    fn test_checkout_form_for_returning_customer() {
        let form = checkout_form(&checkout_request(Some("cus_123"), None));

        assert_eq!(field(&form, "customer"), Some("cus_123"));
        assert_eq!(field(&form, "customer_email"), None);
        assert_eq!(field(&form, "subscription_data[trial_period_days]"), None);
    }

    #[tokio::test]
    async fn test_create_checkout_session() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("mode=subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = StripeClient::with_base_url("sk_test_123", mock_server.uri())?;
        let session = client
            .create_checkout_session(checkout_request(None, Some(30)))
            .await?;

        assert_eq!(session.id, "cs_test_1");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_1")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_create_billing_portal_session() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/billing_portal/sessions"))
            .and(body_string_contains("customer=cus_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "bps_1",
                "url": null
            })))
            .mount(&mock_server)
            .await;

        let client = StripeClient::with_base_url("sk_test_123", mock_server.uri())?;
        let session = client
            .create_billing_portal_session("cus_123", "https://acme.atrium.dev/")
            .await?;

        assert_eq!(session.id, "bps_1");
        assert_eq!(session.url, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_api_error_surfaces_stripe_message() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/billing_portal/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "No such customer: 'cus_missing'", "type": "invalid_request_error" }
            })))
            .mount(&mock_server)
            .await;

        let client = StripeClient::with_base_url("sk_test_123", mock_server.uri())?;
        let err = client
            .create_billing_portal_session("cus_missing", "https://acme.atrium.dev/")
            .await
            .unwrap_err();

        match err {
            PaymentProviderError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "No such customer: 'cus_missing'");
            }
            other => panic!("unexpected error: {}", other),
        }
        Ok(())
    }
}
