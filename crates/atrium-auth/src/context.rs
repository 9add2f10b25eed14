use super::permissions::Permission;
use atrium_entities::users;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user: users::Model,
    /// Workspace the access token was issued for
    pub workspace_id: Uuid,
}

impl AuthContext {
    pub fn new(user: users::Model, workspace_id: Uuid) -> Self {
        Self { user, workspace_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        permission.is_granted_to(&self.user)
    }
}
