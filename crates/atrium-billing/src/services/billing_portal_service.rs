use std::sync::Arc;

use atrium_config::{DomainManagerService, EnvironmentService};
use atrium_database::DbConnection;
use atrium_entities::{billing_subscriptions, user_workspaces, users, workspaces};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::error::BillingError;
use crate::plan::{BillingPlanKey, BillingPricesPerPlan};
use crate::provider::{CheckoutSessionRequest, PaymentProvider, SubscriptionLineItem};

const TRIAL_WITH_CREDIT_CARD_DAYS: &str = "BILLING_FREE_TRIAL_WITH_CREDIT_CARD_DURATION_IN_DAYS";
const TRIAL_WITHOUT_CREDIT_CARD_DAYS: &str =
    "BILLING_FREE_TRIAL_WITHOUT_CREDIT_CARD_DURATION_IN_DAYS";

pub struct CheckoutSessionParams {
    pub user: users::Model,
    pub workspace: workspaces::Model,
    pub prices: Option<BillingPricesPerPlan>,
    pub success_url_path: Option<String>,
    pub plan: BillingPlanKey,
    pub require_payment_method: bool,
}

/// Base price billed per seat, then every metered price without a quantity.
pub fn subscription_line_items(
    quantity: u64,
    prices: Option<&BillingPricesPerPlan>,
) -> Result<Vec<SubscriptionLineItem>, BillingError> {
    let prices = prices.ok_or(BillingError::PriceNotFound)?;

    let mut items = Vec::with_capacity(prices.metered_product_prices.len() + 1);
    items.push(SubscriptionLineItem {
        price: prices.base_product_price.stripe_price_id.clone(),
        quantity: Some(quantity),
    });
    items.extend(
        prices
            .metered_product_prices
            .iter()
            .map(|price| SubscriptionLineItem {
                price: price.stripe_price_id.clone(),
                quantity: None,
            }),
    );
    Ok(items)
}

/// Builds checkout and billing portal sessions for a workspace.
pub struct BillingPortalService {
    db: Arc<DbConnection>,
    provider: Arc<dyn PaymentProvider>,
    domain_manager: Arc<DomainManagerService>,
    environment: Arc<EnvironmentService>,
}

impl BillingPortalService {
    pub fn new(
        db: Arc<DbConnection>,
        provider: Arc<dyn PaymentProvider>,
        domain_manager: Arc<DomainManagerService>,
        environment: Arc<EnvironmentService>,
    ) -> Self {
        Self {
            db,
            provider,
            domain_manager,
            environment,
        }
    }

    pub async fn find_workspace(
        &self,
        workspace_id: uuid::Uuid,
    ) -> Result<workspaces::Model, BillingError> {
        workspaces::Entity::find_by_id(workspace_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(BillingError::WorkspaceNotFound)
    }

    /// Checkout URL for subscribing the workspace to `params.plan`.
    ///
    /// Every member is a seat. A workspace that never had a subscription gets a trial.
    pub async fn compute_checkout_session_url(
        &self,
        params: CheckoutSessionParams,
    ) -> Result<String, BillingError> {
        let workspace = &params.workspace;
        let cancel_url = self.domain_manager.build_workspace_url(workspace)?.to_string();
        let success_url = self
            .domain_manager
            .build_workspace_url_with_path(workspace, params.success_url_path.as_deref())?
            .to_string();

        let quantity = user_workspaces::Entity::find()
            .filter(user_workspaces::Column::WorkspaceId.eq(workspace.id))
            .count(self.db.as_ref())
            .await?;

        let subscription = billing_subscriptions::Entity::find()
            .filter(billing_subscriptions::Column::WorkspaceId.eq(workspace.id))
            .one(self.db.as_ref())
            .await?;

        let line_items = subscription_line_items(quantity, params.prices.as_ref())?;

        let trial_period_days = if subscription.is_some() {
            None
        } else {
            Some(self.trial_period_days(params.require_payment_method)?)
        };

        debug!(
            "Creating checkout session for workspace {} with {} seats",
            workspace.id, quantity
        );
        let session = self
            .provider
            .create_checkout_session(CheckoutSessionRequest {
                user_email: params.user.email.clone(),
                workspace_id: workspace.id,
                line_items,
                success_url,
                cancel_url,
                customer_id: subscription.and_then(|s| s.stripe_customer_id),
                plan: params.plan,
                require_payment_method: params.require_payment_method,
                trial_period_days,
            })
            .await?;

        session
            .url
            .ok_or(BillingError::SessionUrlMissing { session: "checkout" })
    }

    /// Billing portal URL for the customer behind the workspace's latest subscription.
    pub async fn compute_billing_portal_session_url_or_throw(
        &self,
        workspace: &workspaces::Model,
        return_url_path: Option<&str>,
    ) -> Result<String, BillingError> {
        let last_subscription = billing_subscriptions::Entity::find()
            .filter(billing_subscriptions::Column::WorkspaceId.eq(workspace.id))
            .order_by_desc(billing_subscriptions::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?
            .ok_or(BillingError::SubscriptionNotFound)?;

        let customer_id = last_subscription
            .stripe_customer_id
            .filter(|id| !id.is_empty())
            .ok_or(BillingError::CustomerNotFound)?;

        let return_url = self
            .domain_manager
            .build_workspace_url_with_path(workspace, return_url_path)?
            .to_string();

        let session = self
            .provider
            .create_billing_portal_session(&customer_id, &return_url)
            .await?;

        session
            .url
            .ok_or(BillingError::SessionUrlMissing { session: "billingPortal" })
    }

    fn trial_period_days(&self, require_payment_method: bool) -> Result<i64, BillingError> {
        let variable = if require_payment_method {
            TRIAL_WITH_CREDIT_CARD_DAYS
        } else {
            TRIAL_WITHOUT_CREDIT_CARD_DAYS
        };
        Ok(self.environment.get_number(variable)?)
    }
}
