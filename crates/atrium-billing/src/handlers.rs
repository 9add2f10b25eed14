use std::sync::Arc;

use atrium_auth::RequireAuth;
use atrium_core::problemdetails::Problem;
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{OpenApi, ToSchema};

use crate::plan::{BillingPlanKey, BillingPlanService};
use crate::services::{BillingPortalService, CheckoutSessionParams};

pub struct BillingState {
    pub portal_service: Arc<BillingPortalService>,
    pub plan_service: Arc<BillingPlanService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(create_checkout_session, create_portal_session),
    components(schemas(
        CheckoutSessionRequest,
        PortalSessionRequest,
        SessionUrlResponse,
        BillingPlanKey
    )),
    info(
        title = "Billing API",
        description = "Checkout and billing portal sessions for the caller's workspace",
        version = "1.0.0"
    ),
    tags((name = "Billing", description = "Billing endpoints"))
)]
pub struct BillingApiDoc;

fn default_plan() -> BillingPlanKey {
    BillingPlanKey::Pro
}

fn default_require_payment_method() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    #[serde(default = "default_plan")]
    pub plan: BillingPlanKey,
    pub success_url_path: Option<String>,
    #[serde(default = "default_require_payment_method")]
    pub require_payment_method: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalSessionRequest {
    pub return_url_path: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUrlResponse {
    pub url: String,
}

pub fn configure_routes() -> Router<Arc<BillingState>> {
    Router::new()
        .route("/billing/checkout-session", post(create_checkout_session))
        .route("/billing/portal-session", post(create_portal_session))
}

/// Start a checkout session subscribing the caller's workspace to a plan
#[utoipa::path(
    post,
    path = "/billing/checkout-session",
    request_body = CheckoutSessionRequest,
    responses(
        (status = 200, description = "Checkout session created", body = SessionUrlResponse),
        (status = 400, description = "No prices configured for the plan"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Payment provider error"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Billing",
    security(("bearer_auth" = []))
)]
pub async fn create_checkout_session(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<BillingState>>,
    Json(request): Json<CheckoutSessionRequest>,
) -> Result<impl IntoResponse, Problem> {
    let workspace = state.portal_service.find_workspace(auth.workspace_id).await?;
    let prices = state.plan_service.get_prices_per_plan(request.plan)?;

    let url = state
        .portal_service
        .compute_checkout_session_url(CheckoutSessionParams {
            user: auth.user.clone(),
            workspace,
            prices,
            success_url_path: request.success_url_path,
            plan: request.plan,
            require_payment_method: request.require_payment_method,
        })
        .await?;

    info!(
        "Checkout session for plan {} created by user {} on workspace {}",
        request.plan.as_str(),
        auth.user_id(),
        auth.workspace_id
    );
    Ok(Json(SessionUrlResponse { url }))
}

/// Open the billing portal for the caller's workspace
#[utoipa::path(
    post,
    path = "/billing/portal-session",
    request_body = PortalSessionRequest,
    responses(
        (status = 200, description = "Billing portal session created", body = SessionUrlResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Workspace has no subscription or customer"),
        (status = 502, description = "Payment provider error"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Billing",
    security(("bearer_auth" = []))
)]
pub async fn create_portal_session(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<BillingState>>,
    Json(request): Json<PortalSessionRequest>,
) -> Result<impl IntoResponse, Problem> {
    let workspace = state.portal_service.find_workspace(auth.workspace_id).await?;

    let url = state
        .portal_service
        .compute_billing_portal_session_url_or_throw(&workspace, request.return_url_path.as_deref())
        .await?;

    Ok(Json(SessionUrlResponse { url }))
}
