use atrium_entities::users;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use utoipa::ToSchema;

/// Admin capabilities, each backed by a flag on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ImpersonateUsers,
    AccessAdminPanel,
}

impl Permission {
    pub fn is_granted_to(&self, user: &users::Model) -> bool {
        match self {
            Permission::ImpersonateUsers => user.can_impersonate,
            Permission::AccessAdminPanel => user.can_access_full_admin_panel,
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Permission::ImpersonateUsers => "impersonate_users",
            Permission::AccessAdminPanel => "access_admin_panel",
        };
        write!(f, "{}", name)
    }
}
