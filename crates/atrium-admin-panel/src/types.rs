//! Request and response bodies of the admin panel API

use atrium_auth::AuthToken;
use atrium_config::{EnvironmentVariablesGroup, WorkspaceUrls};
use atrium_entities::FeatureFlagKey;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    pub name: String,
    pub description: String,
    /// Always the display string, whatever the variable's type
    pub value: String,
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariablesGroupData {
    pub name: EnvironmentVariablesGroup,
    pub description: String,
    pub is_hidden_on_load: bool,
    pub variables: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnvironmentVariablesOutput {
    pub groups: Vec<EnvironmentVariablesGroupData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&atrium_entities::users::Model> for UserInfo {
    fn from(user: &atrium_entities::users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeatureFlagValue {
    pub key: FeatureFlagKey,
    pub value: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub id: Uuid,
    pub name: String,
    pub total_users: usize,
    pub logo: Option<String>,
    pub allow_impersonation: bool,
    pub users: Vec<UserInfo>,
    pub feature_flags: Vec<FeatureFlagValue>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserLookup {
    pub user: UserInfo,
    pub workspaces: Vec<WorkspaceInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub current_version: Option<String>,
    pub latest_version: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonatedWorkspace {
    pub id: Uuid,
    pub workspace_urls: WorkspaceUrls,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonateOutput {
    pub workspace: ImpersonatedWorkspace,
    pub login_token: AuthToken,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonateRequest {
    pub user_id: Uuid,
    pub workspace_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLookupRequest {
    /// Email address, or user id when it contains no `@`
    pub user_identifier: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFeatureFlagRequest {
    pub key: FeatureFlagKey,
    pub value: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFeatureFlags {
    pub workspace_id: Uuid,
    pub feature_flags: Vec<FeatureFlagValue>,
}
