use std::sync::Arc;

use atrium_database::DbConnection;
use atrium_entities::{user_workspaces, users};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::context::AuthContext;
use crate::token_service::{AuthToken, TokenError, TokenService};

#[derive(Error, Debug)]
pub enum AuthServiceError {
    #[error("Invalid login token: {0}")]
    InvalidLoginToken(TokenError),

    #[error("Invalid access token: {0}")]
    InvalidAccessToken(TokenError),

    #[error("User not found")]
    UserNotFound,

    #[error("User is not a member of workspace {workspace_id}")]
    NotAMember { workspace_id: Uuid },

    #[error("Failed to issue token: {0}")]
    TokenIssue(TokenError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Turns login tokens into access tokens and access tokens into callers.
pub struct AuthService {
    db: Arc<DbConnection>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(db: Arc<DbConnection>, token_service: Arc<TokenService>) -> Self {
        Self { db, token_service }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    pub async fn exchange_login_token(&self, login_token: &str) -> Result<AuthToken, AuthServiceError> {
        let claims = self
            .token_service
            .verify_login_token(login_token)
            .map_err(AuthServiceError::InvalidLoginToken)?;

        self.issue_access_token(&claims.sub, claims.workspace_id).await
    }

    /// Mint an access token for the member of `workspace_id` with this email.
    pub async fn issue_access_token(
        &self,
        email: &str,
        workspace_id: Uuid,
    ) -> Result<AuthToken, AuthServiceError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        self.ensure_member(user.id, workspace_id).await?;

        debug!("Issuing access token for user {} in workspace {}", user.id, workspace_id);
        self.token_service
            .generate_access_token(user.id, workspace_id)
            .map_err(AuthServiceError::TokenIssue)
    }

    /// Resolve the caller behind an access token.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthContext, AuthServiceError> {
        let claims = self
            .token_service
            .verify_access_token(access_token)
            .map_err(AuthServiceError::InvalidAccessToken)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
            AuthServiceError::InvalidAccessToken(TokenError::Invalid(e.to_string()))
        })?;

        let user = users::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        self.ensure_member(user.id, claims.workspace_id).await?;

        Ok(AuthContext::new(user, claims.workspace_id))
    }

    async fn ensure_member(&self, user_id: Uuid, workspace_id: Uuid) -> Result<(), AuthServiceError> {
        let memberships = user_workspaces::Entity::find()
            .filter(user_workspaces::Column::UserId.eq(user_id))
            .filter(user_workspaces::Column::WorkspaceId.eq(workspace_id))
            .count(self.db.as_ref())
            .await?;

        if memberships == 0 {
            return Err(AuthServiceError::NotAMember { workspace_id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_database::test_utils::TestDatabase;

    fn service(test_db: &TestDatabase) -> AuthService {
        AuthService::new(
            test_db.connection_arc(),
            Arc::new(TokenService::new("test-secret", 900, 86400)),
        )
    }

    #[tokio::test]
    async fn test_exchange_login_token_for_member() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let user = test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let workspace = test_db.create_workspace(Some("Acme"), "acme", true).await?;
        test_db.add_member(user.id, workspace.id).await?;

        let svc = service(&test_db);
        let login = svc.token_service().generate_login_token(&user.email, workspace.id)?;
        let access = svc.exchange_login_token(&login.token).await?;

        let context = svc.authenticate(&access.token).await?;
        assert_eq!(context.user_id(), user.id);
        assert_eq!(context.workspace_id, workspace.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_exchange_rejects_non_member() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let user = test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let workspace = test_db.create_workspace(Some("Acme"), "acme", true).await?;

        let svc = service(&test_db);
        let login = svc.token_service().generate_login_token(&user.email, workspace.id)?;
        let err = svc.exchange_login_token(&login.token).await.unwrap_err();

        assert!(matches!(err, AuthServiceError::NotAMember { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_exchange_rejects_access_token() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let svc = service(&test_db);

        let access = svc
            .token_service()
            .generate_access_token(Uuid::new_v4(), Uuid::new_v4())?;
        let err = svc.exchange_login_token(&access.token).await.unwrap_err();

        assert!(matches!(err, AuthServiceError::InvalidLoginToken(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_issue_access_token_for_unknown_email() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let err = service(&test_db)
            .issue_access_token("ghost@acme.dev", Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthServiceError::UserNotFound));
        Ok(())
    }
}
