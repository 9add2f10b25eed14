use std::sync::Arc;

use atrium_admin_panel::AdminPanelPlugin;
use atrium_auth::AuthPlugin;
use atrium_billing::BillingPlugin;
use atrium_config::{ConfigPlugin, EnvironmentService, ServerConfig};
use atrium_core::plugin::PluginManager;
use atrium_database::DbConnection;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::debug;
use utoipa_swagger_ui::SwaggerUi;

/// Register every plugin in dependency order and initialize them.
pub async fn build_plugin_manager(
    config: Arc<ServerConfig>,
    environment: Arc<EnvironmentService>,
    db: Arc<DbConnection>,
) -> anyhow::Result<PluginManager> {
    let mut plugin_manager = PluginManager::new();
    plugin_manager.service_context().register_service(db);

    // 1. ConfigPlugin - configuration and workspace URLs
    plugin_manager.register_plugin(Box::new(ConfigPlugin::new(config, environment)));
    // 2. AuthPlugin - tokens and the bearer middleware
    plugin_manager.register_plugin(Box::new(AuthPlugin::new()));
    // 3. AdminPanelPlugin
    plugin_manager.register_plugin(Box::new(AdminPanelPlugin::new()));
    // 4. BillingPlugin - inert unless IS_BILLING_ENABLED
    plugin_manager.register_plugin(Box::new(BillingPlugin::new()));

    plugin_manager
        .initialize_plugins()
        .await
        .map_err(|e| anyhow::anyhow!("Plugin initialization failed: {}", e))?;
    debug!("All plugins initialized successfully");

    Ok(plugin_manager)
}

/// Plugin routes under `/api`, plus the health probe and the API docs.
pub fn build_application(plugin_manager: &PluginManager) -> anyhow::Result<Router> {
    let api_doc = plugin_manager.get_unified_openapi();

    let app = plugin_manager
        .build_application()
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
