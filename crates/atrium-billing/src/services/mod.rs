mod billing_portal_service;

pub use billing_portal_service::{
    subscription_line_items, BillingPortalService, CheckoutSessionParams,
};
