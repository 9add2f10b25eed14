use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use utoipa::ToSchema;

/// Display category of a configuration variable in the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentVariablesGroup {
    ServerConfig,
    TokensDuration,
    BillingConfig,
    Logging,
}

impl EnvironmentVariablesGroup {
    pub const ALL: [EnvironmentVariablesGroup; 4] = [
        EnvironmentVariablesGroup::ServerConfig,
        EnvironmentVariablesGroup::TokensDuration,
        EnvironmentVariablesGroup::BillingConfig,
        EnvironmentVariablesGroup::Logging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentVariablesGroup::ServerConfig => "server-config",
            EnvironmentVariablesGroup::TokensDuration => "tokens-duration",
            EnvironmentVariablesGroup::BillingConfig => "billing-config",
            EnvironmentVariablesGroup::Logging => "logging",
        }
    }

    fn metadata(&self) -> GroupMetadata {
        match self {
            EnvironmentVariablesGroup::ServerConfig => GroupMetadata {
                position: 100,
                description: "Core server settings: where the server listens, the database it \
                              uses and the URLs it builds for workspaces.",
                is_hidden_on_load: false,
            },
            EnvironmentVariablesGroup::TokensDuration => GroupMetadata {
                position: 200,
                description: "Lifetime of the login tokens used for impersonation and of the \
                              access tokens they are exchanged for.",
                is_hidden_on_load: true,
            },
            EnvironmentVariablesGroup::BillingConfig => GroupMetadata {
                position: 300,
                description: "Payment provider credentials, plan prices and trial lengths.",
                is_hidden_on_load: true,
            },
            EnvironmentVariablesGroup::Logging => GroupMetadata {
                position: 400,
                description: "Verbosity and format of the server logs.",
                is_hidden_on_load: true,
            },
        }
    }
}

impl Display for EnvironmentVariablesGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMetadata {
    pub position: u32,
    pub description: &'static str,
    pub is_hidden_on_load: bool,
}

/// Static display metadata for every group, built once on first access.
pub static GROUP_METADATA: Lazy<HashMap<EnvironmentVariablesGroup, GroupMetadata>> =
    Lazy::new(|| {
        EnvironmentVariablesGroup::ALL
            .iter()
            .map(|group| (*group, group.metadata()))
            .collect()
    });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_group_has_metadata() {
        for group in EnvironmentVariablesGroup::ALL {
            assert!(GROUP_METADATA.contains_key(&group), "{} has no metadata", group);
        }
    }

    #[test]
    fn test_group_positions_are_unique() {
        let mut positions: Vec<u32> = GROUP_METADATA.values().map(|m| m.position).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), EnvironmentVariablesGroup::ALL.len());
    }

    #[test]
    fn test_group_serializes_to_its_display_name() {
        let json = serde_json::to_value(EnvironmentVariablesGroup::TokensDuration).unwrap();
        assert_eq!(json, serde_json::json!("tokens-duration"));
    }
}
