//! Subscription plans and the provider prices configured for them

use std::sync::Arc;

use atrium_config::EnvironmentService;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::BillingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingPlanKey {
    Pro,
    Enterprise,
}

impl BillingPlanKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPlanKey::Pro => "PRO",
            BillingPlanKey::Enterprise => "ENTERPRISE",
        }
    }

    fn base_price_variable(&self) -> &'static str {
        match self {
            BillingPlanKey::Pro => "BILLING_PLAN_PRO_BASE_PRICE_ID",
            BillingPlanKey::Enterprise => "BILLING_PLAN_ENTERPRISE_BASE_PRICE_ID",
        }
    }

    fn metered_prices_variable(&self) -> &'static str {
        match self {
            BillingPlanKey::Pro => "BILLING_PLAN_PRO_METERED_PRICE_IDS",
            BillingPlanKey::Enterprise => "BILLING_PLAN_ENTERPRISE_METERED_PRICE_IDS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingPrice {
    pub stripe_price_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingPricesPerPlan {
    pub base_product_price: BillingPrice,
    pub metered_product_prices: Vec<BillingPrice>,
}

pub struct BillingPlanService {
    environment: Arc<EnvironmentService>,
}

impl BillingPlanService {
    pub fn new(environment: Arc<EnvironmentService>) -> Self {
        Self { environment }
    }

    /// Prices configured for `plan`, or `None` when the plan has no base price.
    pub fn get_prices_per_plan(
        &self,
        plan: BillingPlanKey,
    ) -> Result<Option<BillingPricesPerPlan>, BillingError> {
        let Some(base_price_id) = self
            .environment
            .get_optional_string(plan.base_price_variable())?
        else {
            return Ok(None);
        };

        let metered_product_prices = self
            .environment
            .get_list(plan.metered_prices_variable())?
            .iter()
            .map(|id| BillingPrice {
                stripe_price_id: id.clone(),
            })
            .collect();

        Ok(Some(BillingPricesPerPlan {
            base_product_price: BillingPrice {
                stripe_price_id: base_price_id.to_string(),
            },
            metered_product_prices,
        }))
    }
}
