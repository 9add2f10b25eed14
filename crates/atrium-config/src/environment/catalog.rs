//! Every configuration variable the server understands

use super::groups::EnvironmentVariablesGroup as Group;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    String,
    Number,
    Bool,
    /// Comma separated values
    List,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableDefinition {
    pub name: &'static str,
    pub group: Group,
    pub description: &'static str,
    pub sensitive: bool,
    pub kind: VariableKind,
    pub default: Option<&'static str>,
}

const fn var(
    name: &'static str,
    group: Group,
    kind: VariableKind,
    default: Option<&'static str>,
    description: &'static str,
) -> VariableDefinition {
    VariableDefinition {
        name,
        group,
        description,
        sensitive: false,
        kind,
        default,
    }
}

const fn secret(name: &'static str, group: Group, description: &'static str) -> VariableDefinition {
    VariableDefinition {
        name,
        group,
        description,
        sensitive: true,
        kind: VariableKind::String,
        default: None,
    }
}

pub const DEFAULT_VERSION_REGISTRY_URL: &str =
    "https://hub.docker.com/v2/repositories/atriumcrm/atrium/tags?page_size=100";

pub static CATALOG: &[VariableDefinition] = &[
    // Server
    var(
        "SERVER_ADDRESS",
        Group::ServerConfig,
        VariableKind::String,
        Some("0.0.0.0:3000"),
        "Address the HTTP server binds to",
    ),
    VariableDefinition {
        name: "DATABASE_URL",
        group: Group::ServerConfig,
        description: "Connection string of the primary database",
        sensitive: true,
        kind: VariableKind::String,
        default: Some("sqlite://atrium.db?mode=rwc"),
    },
    secret(
        "APP_SECRET",
        Group::ServerConfig,
        "Secret used to derive every token signing key",
    ),
    var(
        "APP_VERSION",
        Group::ServerConfig,
        VariableKind::String,
        Some(env!("CARGO_PKG_VERSION")),
        "Version of the running server",
    ),
    var(
        "FRONTEND_URL",
        Group::ServerConfig,
        VariableKind::String,
        Some("http://localhost:3001"),
        "Base URL of the web application",
    ),
    var(
        "IS_MULTIWORKSPACE_ENABLED",
        Group::ServerConfig,
        VariableKind::Bool,
        Some("false"),
        "Serve each workspace from its own subdomain",
    ),
    var(
        "DEFAULT_SUBDOMAIN",
        Group::ServerConfig,
        VariableKind::String,
        Some("app"),
        "Subdomain used when no workspace is selected",
    ),
    var(
        "VERSION_REGISTRY_URL",
        Group::ServerConfig,
        VariableKind::String,
        Some(DEFAULT_VERSION_REGISTRY_URL),
        "Tag listing queried to find the latest published version",
    ),
    // Tokens
    var(
        "LOGIN_TOKEN_EXPIRES_IN_SECONDS",
        Group::TokensDuration,
        VariableKind::Number,
        Some("900"),
        "Lifetime of a login token",
    ),
    var(
        "ACCESS_TOKEN_EXPIRES_IN_SECONDS",
        Group::TokensDuration,
        VariableKind::Number,
        Some("86400"),
        "Lifetime of an access token",
    ),
    // Billing
    var(
        "IS_BILLING_ENABLED",
        Group::BillingConfig,
        VariableKind::Bool,
        Some("false"),
        "Expose checkout and billing portal sessions",
    ),
    secret(
        "BILLING_STRIPE_API_KEY",
        Group::BillingConfig,
        "Secret key of the Stripe account",
    ),
    var(
        "BILLING_STRIPE_BASE_URL",
        Group::BillingConfig,
        VariableKind::String,
        Some("https://api.stripe.com"),
        "Base URL of the Stripe API",
    ),
    var(
        "BILLING_FREE_TRIAL_WITH_CREDIT_CARD_DURATION_IN_DAYS",
        Group::BillingConfig,
        VariableKind::Number,
        Some("30"),
        "Trial length when a payment method is collected at checkout",
    ),
    var(
        "BILLING_FREE_TRIAL_WITHOUT_CREDIT_CARD_DURATION_IN_DAYS",
        Group::BillingConfig,
        VariableKind::Number,
        Some("7"),
        "Trial length when no payment method is collected at checkout",
    ),
    var(
        "BILLING_PLAN_PRO_BASE_PRICE_ID",
        Group::BillingConfig,
        VariableKind::String,
        None,
        "Per seat price of the Pro plan",
    ),
    var(
        "BILLING_PLAN_PRO_METERED_PRICE_IDS",
        Group::BillingConfig,
        VariableKind::List,
        None,
        "Metered prices attached to the Pro plan",
    ),
    var(
        "BILLING_PLAN_ENTERPRISE_BASE_PRICE_ID",
        Group::BillingConfig,
        VariableKind::String,
        None,
        "Per seat price of the Enterprise plan",
    ),
    var(
        "BILLING_PLAN_ENTERPRISE_METERED_PRICE_IDS",
        Group::BillingConfig,
        VariableKind::List,
        None,
        "Metered prices attached to the Enterprise plan",
    ),
    // Logging
    var(
        "ATRIUM_LOG_LEVEL",
        Group::Logging,
        VariableKind::String,
        Some("info"),
        "Log level applied to the server crates",
    ),
    var(
        "ATRIUM_LOG_FORMAT",
        Group::Logging,
        VariableKind::String,
        Some("compact"),
        "Log output format: compact or full",
    ),
];

pub fn find(name: &str) -> Option<&'static VariableDefinition> {
    CATALOG.iter().find(|definition| definition.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<&str> = CATALOG.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_numbers_and_bools_have_parseable_defaults() {
        for definition in CATALOG {
            match definition.kind {
                VariableKind::Number => {
                    let default = definition.default.unwrap_or_default();
                    assert!(default.parse::<i64>().is_ok(), "{}", definition.name);
                }
                VariableKind::Bool => {
                    let default = definition.default.unwrap_or_default();
                    assert!(matches!(default, "true" | "false"), "{}", definition.name);
                }
                VariableKind::String | VariableKind::List => {}
            }
        }
    }
}
