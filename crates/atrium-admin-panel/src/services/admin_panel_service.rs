use std::collections::HashMap;
use std::sync::Arc;

use atrium_auth::TokenService;
use atrium_config::{DomainManagerService, EnvironmentService, GROUP_METADATA};
use atrium_database::DbConnection;
use atrium_entities::{feature_flags, user_workspaces, users, workspaces, FeatureFlagKey};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::environment_groups::group_environment_variables;
use super::feature_flags::merge_feature_flags;
use super::version::{VersionRegistryClient, LATEST_TAG};
use crate::error::AdminPanelError;
use crate::types::{
    EnvironmentVariablesOutput, FeatureFlagValue, ImpersonateOutput, ImpersonatedWorkspace,
    UserInfo, UserLookup, VersionInfo, WorkspaceInfo,
};

/// How a user identifier is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupPredicate {
    Email(String),
    Id(Uuid),
    /// Neither an email nor a valid id, nothing can match
    Invalid,
}

/// An identifier containing `@` is an email address, anything else a user id.
pub fn lookup_predicate(identifier: &str) -> LookupPredicate {
    if identifier.contains('@') {
        LookupPredicate::Email(identifier.to_string())
    } else {
        match Uuid::parse_str(identifier) {
            Ok(id) => LookupPredicate::Id(id),
            Err(_) => LookupPredicate::Invalid,
        }
    }
}

pub struct AdminPanelService {
    db: Arc<DbConnection>,
    token_service: Arc<TokenService>,
    environment: Arc<EnvironmentService>,
    domain_manager: Arc<DomainManagerService>,
    version_registry: Arc<VersionRegistryClient>,
}

impl AdminPanelService {
    pub fn new(
        db: Arc<DbConnection>,
        token_service: Arc<TokenService>,
        environment: Arc<EnvironmentService>,
        domain_manager: Arc<DomainManagerService>,
        version_registry: Arc<VersionRegistryClient>,
    ) -> Self {
        Self {
            db,
            token_service,
            environment,
            domain_manager,
            version_registry,
        }
    }

    /// Issue a login token that signs the caller in as `user_id` on `workspace_id`.
    ///
    /// The user must be a member of the workspace and the workspace must allow
    /// impersonation.
    pub async fn impersonate(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<ImpersonateOutput, AdminPanelError> {
        let user = users::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AdminPanelError::ImpersonationNotAllowed)?;

        let workspace = workspaces::Entity::find_by_id(workspace_id)
            .filter(workspaces::Column::AllowImpersonation.eq(true))
            .one(self.db.as_ref())
            .await?
            .ok_or(AdminPanelError::ImpersonationNotAllowed)?;

        let memberships = user_workspaces::Entity::find()
            .filter(user_workspaces::Column::UserId.eq(user.id))
            .filter(user_workspaces::Column::WorkspaceId.eq(workspace.id))
            .count(self.db.as_ref())
            .await?;
        if memberships == 0 {
            return Err(AdminPanelError::ImpersonationNotAllowed);
        }

        let login_token = self
            .token_service
            .generate_login_token(&user.email, workspace.id)?;
        let workspace_urls = self.domain_manager.get_workspace_urls(&workspace)?;

        info!("Issued impersonation login token for user {} on workspace {}", user.id, workspace.id);
        Ok(ImpersonateOutput {
            workspace: ImpersonatedWorkspace {
                id: workspace.id,
                workspace_urls,
            },
            login_token,
        })
    }

    /// A user and every workspace they belong to, with members and the full flag set.
    pub async fn user_lookup(&self, user_identifier: &str) -> Result<UserLookup, AdminPanelError> {
        let query = match lookup_predicate(user_identifier) {
            LookupPredicate::Email(email) => {
                users::Entity::find().filter(users::Column::Email.eq(email))
            }
            LookupPredicate::Id(id) => users::Entity::find().filter(users::Column::Id.eq(id)),
            LookupPredicate::Invalid => {
                debug!("User identifier '{}' is neither an email nor an id", user_identifier);
                return Err(AdminPanelError::UserNotFound);
            }
        };

        let user = query
            .one(self.db.as_ref())
            .await?
            .ok_or(AdminPanelError::UserNotFound)?;

        let memberships = user_workspaces::Entity::find()
            .filter(user_workspaces::Column::UserId.eq(user.id))
            .order_by_asc(user_workspaces::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        if memberships.is_empty() {
            return Ok(UserLookup {
                user: UserInfo::from(&user),
                workspaces: Vec::new(),
            });
        }

        let workspace_ids: Vec<Uuid> = memberships.iter().map(|m| m.workspace_id).collect();

        let mut workspaces_by_id: HashMap<Uuid, workspaces::Model> = workspaces::Entity::find()
            .filter(workspaces::Column::Id.is_in(workspace_ids.clone()))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|workspace| (workspace.id, workspace))
            .collect();

        let members = user_workspaces::Entity::find()
            .filter(user_workspaces::Column::WorkspaceId.is_in(workspace_ids.clone()))
            .order_by_asc(user_workspaces::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        let member_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
        let member_users: HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(member_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|member| (member.id, member))
            .collect();

        let mut flags_by_workspace: HashMap<Uuid, Vec<feature_flags::Model>> = HashMap::new();
        for flag in feature_flags::Entity::find()
            .filter(feature_flags::Column::WorkspaceId.is_in(workspace_ids.clone()))
            .all(self.db.as_ref())
            .await?
        {
            flags_by_workspace.entry(flag.workspace_id).or_default().push(flag);
        }

        let mut workspaces = Vec::with_capacity(workspace_ids.len());
        for workspace_id in workspace_ids {
            let Some(workspace) = workspaces_by_id.remove(&workspace_id) else {
                continue;
            };

            let users: Vec<UserInfo> = members
                .iter()
                .filter(|m| m.workspace_id == workspace.id)
                .filter_map(|m| member_users.get(&m.user_id))
                .map(UserInfo::from)
                .collect();
            let flags = flags_by_workspace.remove(&workspace.id).unwrap_or_default();

            workspaces.push(WorkspaceInfo {
                id: workspace.id,
                name: workspace.display_name.unwrap_or_default(),
                total_users: users.len(),
                logo: workspace.logo,
                allow_impersonation: workspace.allow_impersonation,
                users,
                feature_flags: merge_feature_flags(&flags),
            });
        }

        debug!("User lookup for {} found {} workspaces", user.id, workspaces.len());
        Ok(UserLookup {
            user: UserInfo::from(&user),
            workspaces,
        })
    }

    pub fn get_environment_variables_grouped(
        &self,
    ) -> Result<EnvironmentVariablesOutput, AdminPanelError> {
        let entries = self
            .environment
            .get_all()
            .iter()
            .map(|(name, entry)| (*name, entry));

        Ok(EnvironmentVariablesOutput {
            groups: group_environment_variables(entries, &GROUP_METADATA)?,
        })
    }

    /// Running version next to the newest published release.
    ///
    /// Never fails: any registry problem reports `latest` as the newest version.
    pub async fn get_version_info(&self) -> VersionInfo {
        let current_version = self
            .environment
            .get_optional_string("APP_VERSION")
            .ok()
            .flatten()
            .map(str::to_string);

        let latest_version = match self.version_registry.latest_version().await {
            Ok(version) => version,
            Err(e) => {
                warn!("Error getting latest version: {}", e);
                LATEST_TAG.to_string()
            }
        };

        VersionInfo {
            current_version,
            latest_version,
        }
    }

    /// Store a flag override and return the workspace's complete flag set.
    pub async fn update_workspace_feature_flag(
        &self,
        workspace_id: Uuid,
        key: FeatureFlagKey,
        value: bool,
    ) -> Result<Vec<FeatureFlagValue>, AdminPanelError> {
        workspaces::Entity::find_by_id(workspace_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AdminPanelError::WorkspaceNotFound)?;

        let existing = feature_flags::Entity::find()
            .filter(feature_flags::Column::WorkspaceId.eq(workspace_id))
            .filter(feature_flags::Column::Key.eq(key.as_str()))
            .one(self.db.as_ref())
            .await?;

        match existing {
            Some(flag) => {
                let mut flag = flag.into_active_model();
                flag.value = Set(value);
                flag.update(self.db.as_ref()).await?;
            }
            None => {
                feature_flags::ActiveModel {
                    workspace_id: Set(workspace_id),
                    key: Set(key.as_str().to_string()),
                    value: Set(value),
                    ..Default::default()
                }
                .insert(self.db.as_ref())
                .await?;
            }
        }

        info!("Feature flag {} set to {} on workspace {}", key, value, workspace_id);

        let flags = feature_flags::Entity::find()
            .filter(feature_flags::Column::WorkspaceId.eq(workspace_id))
            .all(self.db.as_ref())
            .await?;
        Ok(merge_feature_flags(&flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_config::EnvironmentVariablesGroup;
    use atrium_database::test_utils::TestDatabase;
    use url::Url;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        test_db: TestDatabase,
        service: AdminPanelService,
        token_service: Arc<TokenService>,
    }

    async fn fixture_with_registry(registry_url: &str, app_version: &str) -> anyhow::Result<Fixture> {
        let test_db = TestDatabase::with_migrations().await?;
        let token_service = Arc::new(TokenService::new("test-secret", 900, 86400));
        let environment = Arc::new(EnvironmentService::load([
            ("APP_SECRET", "test-secret"),
            ("APP_VERSION", app_version),
            ("VERSION_REGISTRY_URL", registry_url),
        ])?);
        let domain_manager = Arc::new(DomainManagerService::new(
            Url::parse("https://atrium.example.com")?,
            true,
        ));
        let version_registry = Arc::new(VersionRegistryClient::new(registry_url)?);

        let service = AdminPanelService::new(
            test_db.connection_arc(),
            token_service.clone(),
            environment,
            domain_manager,
            version_registry,
        );

        Ok(Fixture {
            test_db,
            service,
            token_service,
        })
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        fixture_with_registry("http://127.0.0.1:1/tags", "1.4.0").await
    }

    #[test]
    fn test_lookup_predicate() {
        assert_eq!(
            lookup_predicate("jane@acme.dev"),
            LookupPredicate::Email("jane@acme.dev".to_string())
        );
        let id = Uuid::new_v4();
        assert_eq!(lookup_predicate(&id.to_string()), LookupPredicate::Id(id));
        assert_eq!(lookup_predicate("not-an-id"), LookupPredicate::Invalid);
    }

    #[tokio::test]
    async fn test_impersonate_member_of_open_workspace() -> anyhow::Result<()> {
        let f = fixture().await?;
        let user = f.test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let workspace = f.test_db.create_workspace(Some("Acme"), "acme", true).await?;
        f.test_db.add_member(user.id, workspace.id).await?;

        let output = f.service.impersonate(user.id, workspace.id).await?;

        assert_eq!(output.workspace.id, workspace.id);
        assert_eq!(
            output.workspace.workspace_urls.subdomain_url,
            "https://acme.atrium.example.com/"
        );
        assert_eq!(output.workspace.workspace_urls.custom_url, None);

        let claims = f.token_service.verify_login_token(&output.login_token.token)?;
        assert_eq!(claims.sub, "jane@acme.dev");
        assert_eq!(claims.workspace_id, workspace.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_impersonate_refused_when_workspace_disallows_it() -> anyhow::Result<()> {
        let f = fixture().await?;
        let user = f.test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let workspace = f.test_db.create_workspace(Some("Acme"), "acme", false).await?;
        f.test_db.add_member(user.id, workspace.id).await?;

        let err = f.service.impersonate(user.id, workspace.id).await.unwrap_err();
        assert!(matches!(err, AdminPanelError::ImpersonationNotAllowed));
        Ok(())
    }

    #[tokio::test]
    async fn test_impersonate_refused_for_non_member() -> anyhow::Result<()> {
        let f = fixture().await?;
        let user = f.test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let workspace = f.test_db.create_workspace(Some("Acme"), "acme", true).await?;

        let err = f.service.impersonate(user.id, workspace.id).await.unwrap_err();
        assert!(matches!(err, AdminPanelError::ImpersonationNotAllowed));

        let err = f
            .service
            .impersonate(Uuid::new_v4(), workspace.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminPanelError::ImpersonationNotAllowed));
        Ok(())
    }

    #[tokio::test]
    async fn test_user_lookup_by_email_and_id() -> anyhow::Result<()> {
        let f = fixture().await?;
        let jane = f.test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let john = f.test_db.create_user("john@acme.dev", "John", "Roe").await?;
        let acme = f.test_db.create_workspace(Some("Acme"), "acme", true).await?;
        let solo = f.test_db.create_workspace(None, "solo", false).await?;
        f.test_db.add_member(jane.id, acme.id).await?;
        f.test_db.add_member(john.id, acme.id).await?;
        f.test_db.add_member(jane.id, solo.id).await?;
        f.test_db
            .set_feature_flag(acme.id, FeatureFlagKey::IsCopilotEnabled, true)
            .await?;

        let lookup = f.service.user_lookup("jane@acme.dev").await?;
        assert_eq!(lookup.user.id, jane.id);
        assert_eq!(lookup.user.first_name, "Jane");
        assert_eq!(lookup.workspaces.len(), 2);

        let acme_info = &lookup.workspaces[0];
        assert_eq!(acme_info.id, acme.id);
        assert_eq!(acme_info.name, "Acme");
        assert_eq!(acme_info.total_users, 2);
        assert!(acme_info.allow_impersonation);
        assert_eq!(acme_info.feature_flags.len(), FeatureFlagKey::all().len());
        assert!(acme_info
            .feature_flags
            .iter()
            .any(|flag| flag.key == FeatureFlagKey::IsCopilotEnabled && flag.value));

        let solo_info = &lookup.workspaces[1];
        assert_eq!(solo_info.name, "");
        assert_eq!(solo_info.total_users, 1);
        assert!(solo_info.feature_flags.iter().all(|flag| !flag.value));

        let by_id = f.service.user_lookup(&john.id.to_string()).await?;
        assert_eq!(by_id.user.email, "john@acme.dev");
        assert_eq!(by_id.workspaces.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_lookup_without_workspaces() -> anyhow::Result<()> {
        let f = fixture().await?;
        f.test_db.create_user("loner@acme.dev", "Lo", "Ner").await?;

        let lookup = f.service.user_lookup("loner@acme.dev").await?;
        assert!(lookup.workspaces.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_user_lookup_not_found() -> anyhow::Result<()> {
        let f = fixture().await?;
        let random_id = Uuid::new_v4().to_string();

        for identifier in ["ghost@acme.dev", "not-an-id", random_id.as_str()] {
            let err = f.service.user_lookup(identifier).await.unwrap_err();
            assert!(matches!(err, AdminPanelError::UserNotFound), "{}", identifier);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_environment_variables_grouped() -> anyhow::Result<()> {
        let f = fixture().await?;

        let output = f.service.get_environment_variables_grouped()?;

        assert_eq!(output.groups[0].name, EnvironmentVariablesGroup::ServerConfig);
        let mut seen = std::collections::HashSet::new();
        for group in &output.groups {
            assert!(seen.insert(group.name), "{} listed twice", group.name);
        }
        let server = &output.groups[0];
        let version = server
            .variables
            .iter()
            .find(|v| v.name == "APP_VERSION")
            .unwrap();
        assert_eq!(version.value, "1.4.0");
        let secret = server.variables.iter().find(|v| v.name == "APP_SECRET").unwrap();
        assert!(secret.sensitive);
        Ok(())
    }

    #[tokio::test]
    async fn test_version_info_from_registry() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "name": "1.2.0" }, { "name": "2.0.0" }, { "name": "latest" }, { "name": "bogus" }]
            })))
            .mount(&mock_server)
            .await;
        let f = fixture_with_registry(&format!("{}/tags", mock_server.uri()), "1.2.0").await?;

        let info = f.service.get_version_info().await;

        assert_eq!(info.current_version.as_deref(), Some("1.2.0"));
        assert_eq!(info.latest_version, "2.0.0");
        Ok(())
    }

    #[tokio::test]
    async fn test_version_info_degrades_on_registry_failure() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;
        let f = fixture_with_registry(&format!("{}/tags", mock_server.uri()), "1.2.0").await?;

        let info = f.service.get_version_info().await;

        assert_eq!(info.current_version.as_deref(), Some("1.2.0"));
        assert_eq!(info.latest_version, "latest");
        Ok(())
    }

    #[tokio::test]
    async fn test_version_info_without_current_version() -> anyhow::Result<()> {
        let f = fixture_with_registry("http://127.0.0.1:1/tags", "").await?;

        let info = f.service.get_version_info().await;

        assert_eq!(info.current_version, None);
        assert_eq!(info.latest_version, "latest");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_feature_flag_upserts() -> anyhow::Result<()> {
        let f = fixture().await?;
        let workspace = f.test_db.create_workspace(Some("Acme"), "acme", true).await?;

        let flags = f
            .service
            .update_workspace_feature_flag(workspace.id, FeatureFlagKey::IsWorkflowEnabled, true)
            .await?;
        assert!(flags
            .iter()
            .any(|flag| flag.key == FeatureFlagKey::IsWorkflowEnabled && flag.value));

        let flags = f
            .service
            .update_workspace_feature_flag(workspace.id, FeatureFlagKey::IsWorkflowEnabled, false)
            .await?;
        assert!(flags.iter().all(|flag| !flag.value));

        let rows = feature_flags::Entity::find()
            .filter(feature_flags::Column::WorkspaceId.eq(workspace.id))
            .count(f.test_db.connection())
            .await?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_feature_flag_unknown_workspace() -> anyhow::Result<()> {
        let f = fixture().await?;

        let err = f
            .service
            .update_workspace_feature_flag(Uuid::new_v4(), FeatureFlagKey::IsCopilotEnabled, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminPanelError::WorkspaceNotFound));
        Ok(())
    }
}
