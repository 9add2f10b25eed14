use atrium_config::{DomainManagerError, EnvironmentError};
use atrium_core::error_builder::{bad_gateway, bad_request, internal_server_error, not_found};
use atrium_core::problemdetails::Problem;
use std::fmt::Display;
use thiserror::Error;
use tracing::error;

use crate::provider::PaymentProviderError;

/// Machine readable codes of billing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingExceptionCode {
    BillingPriceNotFound,
    BillingSubscriptionNotFound,
    BillingCustomerNotFound,
    BillingSessionUrlMissing,
    BillingProviderError,
}

impl BillingExceptionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingExceptionCode::BillingPriceNotFound => "BILLING_PRICE_NOT_FOUND",
            BillingExceptionCode::BillingSubscriptionNotFound => "BILLING_SUBSCRIPTION_NOT_FOUND",
            BillingExceptionCode::BillingCustomerNotFound => "BILLING_CUSTOMER_NOT_FOUND",
            BillingExceptionCode::BillingSessionUrlMissing => "BILLING_SESSION_URL_MISSING",
            BillingExceptionCode::BillingProviderError => "BILLING_PROVIDER_ERROR",
        }
    }
}

impl Display for BillingExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for BillingExceptionCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Missing Billing prices per plan")]
    PriceNotFound,

    #[error("Error: missing subscription")]
    SubscriptionNotFound,

    #[error("Error: missing stripeCustomerId")]
    CustomerNotFound,

    #[error("Error: missing {session}.session.url")]
    SessionUrlMissing { session: &'static str },

    #[error("Workspace not found")]
    WorkspaceNotFound,

    #[error("Payment provider error: {0}")]
    Provider(#[from] PaymentProviderError),

    #[error("Failed to build workspace URL: {0}")]
    Domain(#[from] DomainManagerError),

    #[error("Billing configuration error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl BillingError {
    pub fn code(&self) -> Option<BillingExceptionCode> {
        match self {
            BillingError::PriceNotFound => Some(BillingExceptionCode::BillingPriceNotFound),
            BillingError::SubscriptionNotFound => {
                Some(BillingExceptionCode::BillingSubscriptionNotFound)
            }
            BillingError::CustomerNotFound => Some(BillingExceptionCode::BillingCustomerNotFound),
            BillingError::SessionUrlMissing { .. } => {
                Some(BillingExceptionCode::BillingSessionUrlMissing)
            }
            BillingError::Provider(_) => Some(BillingExceptionCode::BillingProviderError),
            _ => None,
        }
    }
}

impl From<BillingError> for Problem {
    fn from(err: BillingError) -> Self {
        let code = err.code();
        let builder = match &err {
            BillingError::PriceNotFound => bad_request().title("Billing Price Not Found"),
            BillingError::SubscriptionNotFound | BillingError::CustomerNotFound => {
                not_found().title("Billing Subscription Not Found")
            }
            BillingError::WorkspaceNotFound => not_found(),
            BillingError::Provider(_) => {
                error!("Billing provider failure: {}", err);
                bad_gateway()
            }
            BillingError::SessionUrlMissing { .. }
            | BillingError::Domain(_)
            | BillingError::Environment(_)
            | BillingError::Database(_) => {
                error!("Billing failure: {}", err);
                internal_server_error()
            }
        };

        let builder = builder.detail(err.to_string());
        match code {
            Some(code) => builder.error_code(code).build(),
            None => builder.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_billing_errors_carry_codes() {
        let cases = [
            (BillingError::PriceNotFound, StatusCode::BAD_REQUEST, "BILLING_PRICE_NOT_FOUND"),
            (
                BillingError::SubscriptionNotFound,
                StatusCode::NOT_FOUND,
                "BILLING_SUBSCRIPTION_NOT_FOUND",
            ),
            (
                BillingError::CustomerNotFound,
                StatusCode::NOT_FOUND,
                "BILLING_CUSTOMER_NOT_FOUND",
            ),
            (
                BillingError::SessionUrlMissing { session: "checkout" },
                StatusCode::INTERNAL_SERVER_ERROR,
                "BILLING_SESSION_URL_MISSING",
            ),
        ];

        for (err, status, code) in cases {
            let problem: Problem = err.into();
            assert_eq!(problem.status_code, status);
            assert_eq!(problem.error_code(), Some(code));
        }
    }

    #[test]
    fn test_workspace_not_found_keeps_default_code() {
        let problem: Problem = BillingError::WorkspaceNotFound.into();
        assert_eq!(problem.status_code, StatusCode::NOT_FOUND);
        assert_eq!(problem.error_code(), Some("NOT_FOUND"));
    }
}
