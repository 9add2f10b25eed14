//! Auth plugin: token issuance, the bearer token middleware and the login token
//! exchange route.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use atrium_config::ServerConfig;
use atrium_core::plugin::{
    AtriumPlugin, MiddlewarePriority, PluginContext, PluginError, PluginMiddlewareCollection,
    PluginRoutes, ServiceRegistrationContext,
};
use atrium_database::DbConnection;
use axum::extract::{Request, State};
use axum::middleware::Next;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{self, AuthApiDoc, AuthState};
use crate::{auth_middleware, AuthService, TokenService};

#[derive(Default)]
pub struct AuthPlugin;

impl AuthPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl AtriumPlugin for AuthPlugin {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DbConnection>()?;
            let config = context.require_service::<ServerConfig>()?;

            let token_service = Arc::new(TokenService::new(
                config.app_secret.clone(),
                config.login_token_expires_in_secs,
                config.access_token_expires_in_secs,
            ));
            context.register_service(token_service.clone());

            let auth_service = Arc::new(AuthService::new(db, token_service));
            context.register_service(auth_service.clone());

            context.register_service(Arc::new(AuthState { auth_service }));

            tracing::debug!("Auth plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        let auth_state = context.require_service::<AuthState>()?;
        let router = handlers::configure_routes().with_state(auth_state);
        Ok(Some(PluginRoutes::new(router)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(AuthApiDoc::openapi())
    }

    fn configure_middleware(
        &self,
        context: &PluginContext,
    ) -> Result<Option<PluginMiddlewareCollection>, PluginError> {
        let auth_service = context.require_service::<AuthService>()?;

        let mut collection = PluginMiddlewareCollection::new();
        collection.add_middleware(
            "bearer_auth",
            self.name(),
            MiddlewarePriority::Security,
            move |req: Request, next: Next| {
                let auth_service = auth_service.clone();
                async move { auth_middleware(State(auth_service), req, next).await }
            },
        );

        Ok(Some(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_config::EnvironmentService;
    use atrium_database::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_auth_plugin_registers_services() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let env = EnvironmentService::load([("APP_SECRET", "s3cr3t")])?;

        let context = ServiceRegistrationContext::new();
        context.register_service(test_db.connection_arc());
        context.register_service(Arc::new(ServerConfig::from_environment(&env)?));

        let plugin = AuthPlugin::new();
        assert_eq!(plugin.name(), "auth");
        plugin.register_services(&context).await?;

        assert!(context.get_service::<TokenService>().is_some());
        assert!(context.get_service::<AuthService>().is_some());

        let plugin_context = context.create_plugin_context();
        assert!(plugin.configure_routes(&plugin_context)?.is_some());
        assert_eq!(
            plugin
                .configure_middleware(&plugin_context)?
                .map(|c| c.middleware.len()),
            Some(1)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_auth_plugin_requires_database() {
        let context = ServiceRegistrationContext::new();
        let result = AuthPlugin::new().register_services(&context).await;
        assert!(matches!(result, Err(PluginError::ServiceNotFound { .. })));
    }
}
