use sea_orm::{DeriveActiveEnum, EnumIter, Iterable};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use utoipa::ToSchema;

/// Every feature flag a workspace can carry.
///
/// Lookups report all keys, so adding a variant here makes it show up for every
/// workspace with a `false` default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureFlagKey {
    IsWorkflowEnabled,
    IsCopilotEnabled,
    IsEventObjectEnabled,
    IsAirtableIntegrationEnabled,
    IsPostgresqlIntegrationEnabled,
    IsStripeIntegrationEnabled,
    IsBillingPlansEnabled,
}

impl Display for FeatureFlagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FeatureFlagKey {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlagKey::IsWorkflowEnabled => "IS_WORKFLOW_ENABLED",
            FeatureFlagKey::IsCopilotEnabled => "IS_COPILOT_ENABLED",
            FeatureFlagKey::IsEventObjectEnabled => "IS_EVENT_OBJECT_ENABLED",
            FeatureFlagKey::IsAirtableIntegrationEnabled => "IS_AIRTABLE_INTEGRATION_ENABLED",
            FeatureFlagKey::IsPostgresqlIntegrationEnabled => "IS_POSTGRESQL_INTEGRATION_ENABLED",
            FeatureFlagKey::IsStripeIntegrationEnabled => "IS_STRIPE_INTEGRATION_ENABLED",
            FeatureFlagKey::IsBillingPlansEnabled => "IS_BILLING_PLANS_ENABLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::iter().find(|key| key.as_str() == s)
    }
}

/// Subscription lifecycle as reported by the payment provider.
/// NOTE: Use db_type = "Text" for SQLite compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, DeriveActiveEnum, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "trialing")]
    Trialing,
    #[sea_orm(string_value = "past_due")]
    PastDue,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "incomplete")]
    Incomplete,
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
}
