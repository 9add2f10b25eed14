//! Subscription checkout and billing portal sessions

mod error;
pub mod handlers;
pub mod plan;
mod plugin;
pub mod provider;
pub mod services;

pub use error::{BillingError, BillingExceptionCode};
pub use plan::{BillingPlanKey, BillingPlanService, BillingPricesPerPlan};
pub use plugin::BillingPlugin;
pub use provider::{PaymentProvider, PaymentProviderError, StripeClient};
pub use services::{subscription_line_items, BillingPortalService, CheckoutSessionParams};
