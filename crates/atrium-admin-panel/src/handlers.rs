use std::sync::Arc;

use atrium_auth::{permission_guard, AuthToken, RequireAuth};
use atrium_config::{EnvironmentVariablesGroup, WorkspaceUrls};
use atrium_core::problemdetails::Problem;
use atrium_entities::FeatureFlagKey;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::services::AdminPanelService;
use crate::types::{
    EnvironmentVariable, EnvironmentVariablesGroupData, EnvironmentVariablesOutput,
    FeatureFlagValue, ImpersonateOutput, ImpersonateRequest, ImpersonatedWorkspace,
    UpdateFeatureFlagRequest, UserInfo, UserLookup, UserLookupRequest, VersionInfo,
    WorkspaceFeatureFlags, WorkspaceInfo,
};

pub struct AdminPanelState {
    pub admin_panel_service: Arc<AdminPanelService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        impersonate,
        user_lookup,
        get_environment_variables,
        get_version_info,
        update_workspace_feature_flag
    ),
    components(schemas(
        ImpersonateRequest,
        ImpersonateOutput,
        ImpersonatedWorkspace,
        WorkspaceUrls,
        AuthToken,
        UserLookupRequest,
        UserLookup,
        UserInfo,
        WorkspaceInfo,
        FeatureFlagValue,
        FeatureFlagKey,
        EnvironmentVariablesOutput,
        EnvironmentVariablesGroupData,
        EnvironmentVariablesGroup,
        EnvironmentVariable,
        VersionInfo,
        UpdateFeatureFlagRequest,
        WorkspaceFeatureFlags
    )),
    info(
        title = "Admin Panel API",
        description = "Back-office endpoints for impersonation, user lookup and server configuration",
        version = "1.0.0"
    ),
    tags((name = "Admin Panel", description = "Administration endpoints"))
)]
pub struct AdminPanelApiDoc;

pub fn configure_routes() -> Router<Arc<AdminPanelState>> {
    Router::new()
        .route("/admin-panel/impersonate", post(impersonate))
        .route("/admin-panel/user-lookup", post(user_lookup))
        .route("/admin-panel/environment-variables", get(get_environment_variables))
        .route("/admin-panel/version-info", get(get_version_info))
        .route(
            "/admin-panel/workspaces/{workspace_id}/feature-flags",
            put(update_workspace_feature_flag),
        )
}

/// Issue a login token to sign in as another user
#[utoipa::path(
    post,
    path = "/admin-panel/impersonate",
    request_body = ImpersonateRequest,
    responses(
        (status = 200, description = "Login token issued", body = ImpersonateOutput),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "User not found or impersonation not enabled"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Admin Panel",
    security(("bearer_auth" = []))
)]
pub async fn impersonate(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AdminPanelState>>,
    Json(request): Json<ImpersonateRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ImpersonateUsers);

    let output = state
        .admin_panel_service
        .impersonate(request.user_id, request.workspace_id)
        .await?;

    info!(
        "Admin {} impersonating user {} on workspace {}",
        auth.user_id(),
        request.user_id,
        request.workspace_id
    );
    Ok(Json(output))
}

/// Find a user by email or id, with their workspaces
#[utoipa::path(
    post,
    path = "/admin-panel/user-lookup",
    request_body = UserLookupRequest,
    responses(
        (status = 200, description = "User found", body = UserLookup),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Admin Panel",
    security(("bearer_auth" = []))
)]
pub async fn user_lookup(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AdminPanelState>>,
    Json(request): Json<UserLookupRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, AccessAdminPanel);

    let lookup = state
        .admin_panel_service
        .user_lookup(&request.user_identifier)
        .await?;
    Ok(Json(lookup))
}

/// Server configuration, grouped for display
#[utoipa::path(
    get,
    path = "/admin-panel/environment-variables",
    responses(
        (status = 200, description = "Grouped configuration variables", body = EnvironmentVariablesOutput),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Admin Panel",
    security(("bearer_auth" = []))
)]
pub async fn get_environment_variables(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AdminPanelState>>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, AccessAdminPanel);

    let output = state.admin_panel_service.get_environment_variables_grouped()?;
    Ok(Json(output))
}

/// Running version and newest published release
#[utoipa::path(
    get,
    path = "/admin-panel/version-info",
    responses(
        (status = 200, description = "Version information", body = VersionInfo),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions")
    ),
    tag = "Admin Panel",
    security(("bearer_auth" = []))
)]
pub async fn get_version_info(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AdminPanelState>>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, AccessAdminPanel);

    Ok(Json(state.admin_panel_service.get_version_info().await))
}

/// Set a feature flag on a workspace
#[utoipa::path(
    put,
    path = "/admin-panel/workspaces/{workspace_id}/feature-flags",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID")
    ),
    request_body = UpdateFeatureFlagRequest,
    responses(
        (status = 200, description = "Updated flag set", body = WorkspaceFeatureFlags),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Workspace not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Admin Panel",
    security(("bearer_auth" = []))
)]
pub async fn update_workspace_feature_flag(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AdminPanelState>>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<UpdateFeatureFlagRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, AccessAdminPanel);

    let feature_flags = state
        .admin_panel_service
        .update_workspace_feature_flag(workspace_id, request.key, request.value)
        .await?;

    Ok(Json(WorkspaceFeatureFlags {
        workspace_id,
        feature_flags,
    }))
}
