//! Admin panel plugin

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use atrium_auth::TokenService;
use atrium_config::{DomainManagerService, EnvironmentService, ServerConfig};
use atrium_core::plugin::{
    AtriumPlugin, PluginContext, PluginError, PluginRoutes, ServiceRegistrationContext,
};
use atrium_database::DbConnection;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{self, AdminPanelApiDoc, AdminPanelState};
use crate::services::{AdminPanelService, VersionRegistryClient};

#[derive(Default)]
pub struct AdminPanelPlugin;

impl AdminPanelPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl AtriumPlugin for AdminPanelPlugin {
    fn name(&self) -> &'static str {
        "admin-panel"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let db = context.require_service::<DbConnection>()?;
            let token_service = context.require_service::<TokenService>()?;
            let environment = context.require_service::<EnvironmentService>()?;
            let domain_manager = context.require_service::<DomainManagerService>()?;
            let config = context.require_service::<ServerConfig>()?;

            let version_registry = VersionRegistryClient::new(config.version_registry_url.clone())
                .map_err(|e| PluginError::PluginRegistrationFailed {
                    plugin_name: self.name().to_string(),
                    error: e.to_string(),
                })?;

            let admin_panel_service = Arc::new(AdminPanelService::new(
                db,
                token_service,
                environment,
                domain_manager,
                Arc::new(version_registry),
            ));
            context.register_service(admin_panel_service.clone());
            context.register_service(Arc::new(AdminPanelState { admin_panel_service }));

            tracing::debug!("Admin panel plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        let state = context.require_service::<AdminPanelState>()?;
        let router = handlers::configure_routes().with_state(state);
        Ok(Some(PluginRoutes::new(router)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(AdminPanelApiDoc::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_auth::AuthPlugin;
    use atrium_config::ConfigPlugin;
    use atrium_database::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_admin_panel_plugin_registers_after_config_and_auth() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let environment = Arc::new(EnvironmentService::load([("APP_SECRET", "s3cr3t")])?);
        let server_config = Arc::new(ServerConfig::from_environment(&environment)?);

        let context = ServiceRegistrationContext::new();
        context.register_service(test_db.connection_arc());
        ConfigPlugin::new(server_config, environment)
            .register_services(&context)
            .await?;
        AuthPlugin::new().register_services(&context).await?;

        let plugin = AdminPanelPlugin::new();
        plugin.register_services(&context).await?;

        assert!(context.get_service::<AdminPanelService>().is_some());
        assert!(plugin
            .configure_routes(&context.create_plugin_context())?
            .is_some());
        assert!(plugin.openapi_schema().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_panel_plugin_requires_token_service() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let context = ServiceRegistrationContext::new();
        context.register_service(test_db.connection_arc());

        let result = AdminPanelPlugin::new().register_services(&context).await;
        assert!(matches!(result, Err(PluginError::ServiceNotFound { .. })));
        Ok(())
    }
}
