//! Plugin system for modular service registration and route configuration
//!
//! Every feature crate ships a plugin that:
//! - registers the services it provides into a type-keyed registry
//! - pulls the services it depends on back out of that registry
//! - contributes an axum router, middleware and an OpenAPI document
//!
//! Plugins are initialized in registration order, so a plugin must be registered
//! after every plugin whose services it requires.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use axum::extract::Request;
use axum::response::Response;
use axum::{middleware::Next, Router};
use thiserror::Error;
use tracing::debug;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::{ComponentsBuilder, InfoBuilder, OpenApi, OpenApiBuilder, ServerBuilder};

// Re-export for plugin implementations
pub use axum;
pub use utoipa;

/// Middleware execution priority. Lower values wrap the ones with higher values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MiddlewarePriority {
    /// Authentication, runs before everything else
    Security,
    Observability,
    Business,
    Custom(u16),
}

impl MiddlewarePriority {
    pub fn value(&self) -> u16 {
        match self {
            MiddlewarePriority::Security => 0,
            MiddlewarePriority::Observability => 100,
            MiddlewarePriority::Business => 400,
            MiddlewarePriority::Custom(value) => *value,
        }
    }
}

pub type MiddlewareHandler = Arc<
    dyn Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync,
>;

pub struct PluginMiddleware {
    pub name: String,
    pub plugin_name: String,
    pub priority: MiddlewarePriority,
    pub handler: MiddlewareHandler,
}

impl std::fmt::Debug for PluginMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginMiddleware")
            .field("name", &self.name)
            .field("plugin_name", &self.plugin_name)
            .field("priority", &self.priority)
            .finish()
    }
}

#[derive(Default)]
pub struct PluginMiddlewareCollection {
    pub middleware: Vec<PluginMiddleware>,
}

impl PluginMiddlewareCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_middleware<F, Fut>(
        &mut self,
        name: impl Into<String>,
        plugin_name: impl Into<String>,
        priority: MiddlewarePriority,
        handler: F,
    ) where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.middleware.push(PluginMiddleware {
            name: name.into(),
            plugin_name: plugin_name.into(),
            priority,
            handler: Arc::new(move |req, next| {
                let handler = handler.clone();
                Box::pin(async move { handler(req, next).await })
            }),
        });
    }
}

/// Errors that can occur during plugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin registration failed for '{plugin_name}': {error}")]
    PluginRegistrationFailed { plugin_name: String, error: String },

    #[error("Service '{service_type}' is required but not registered")]
    ServiceNotFound { service_type: String },

    #[error("Failed to initialize plugin system: {0}")]
    InitializationFailed(String),
}

/// Core plugin trait that defines the plugin interface
pub trait AtriumPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Register the services this plugin provides.
    ///
    /// Use `context.require_service::<T>()` to get dependencies.
    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>>;

    fn configure_routes(&self, _context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        Ok(None)
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        None
    }

    fn configure_middleware(
        &self,
        _context: &PluginContext,
    ) -> Result<Option<PluginMiddlewareCollection>, PluginError> {
        Ok(None)
    }
}

/// Route configuration returned by plugins
pub struct PluginRoutes {
    pub router: Router,
}

impl PluginRoutes {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

/// Type-safe service registry for dependency injection
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Send + Sync + 'static + ?Sized>(&self, service: Arc<T>) {
        debug!("Registering service: {}", std::any::type_name::<T>());
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Box::new(service));
    }

    pub fn get<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .and_then(|any| any.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn require<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.get::<T>().ok_or_else(|| PluginError::ServiceNotFound {
            service_type: std::any::type_name::<T>().to_string(),
        })
    }
}

/// Read-only context handed to plugins when building routes and middleware
pub struct PluginContext {
    service_registry: Arc<ServiceRegistry>,
}

impl PluginContext {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            service_registry: registry,
        }
    }

    pub fn get_service<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.service_registry.get::<T>()
    }

    pub fn require_service<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.service_registry.require::<T>()
    }
}

/// Context used while plugins register their services
#[derive(Default)]
pub struct ServiceRegistrationContext {
    service_registry: Arc<ServiceRegistry>,
}

impl ServiceRegistrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_service<T: Send + Sync + 'static + ?Sized>(&self, service: Arc<T>) {
        self.service_registry.register(service);
    }

    pub fn get_service<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.service_registry.get::<T>()
    }

    pub fn require_service<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.service_registry.require::<T>()
    }

    pub fn create_plugin_context(&self) -> PluginContext {
        PluginContext::new(self.service_registry.clone())
    }
}

/// Registers plugins, initializes them and assembles the application router
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn AtriumPlugin>>,
    context: ServiceRegistrationContext,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin (order matters for dependencies)
    pub fn register_plugin(&mut self, plugin: Box<dyn AtriumPlugin>) {
        debug!("Registering plugin: {}", plugin.name());
        self.plugins.push(plugin);
    }

    pub async fn initialize_plugins(&mut self) -> Result<(), PluginError> {
        debug!("Initializing {} plugins", self.plugins.len());

        for plugin in &self.plugins {
            plugin.register_services(&self.context).await.map_err(|e| {
                PluginError::PluginRegistrationFailed {
                    plugin_name: plugin.name().to_string(),
                    error: e.to_string(),
                }
            })?;

            debug!("Successfully initialized plugin: {}", plugin.name());
        }

        Ok(())
    }

    /// Merge every plugin router under `/api` and wrap it in plugin middleware.
    pub fn build_application(&self) -> Result<Router, PluginError> {
        let plugin_context = self.context.create_plugin_context();
        let mut api_router = Router::new();

        for plugin in &self.plugins {
            if let Some(plugin_routes) = plugin.configure_routes(&plugin_context)? {
                debug!("Adding routes for plugin: {}", plugin.name());
                api_router = api_router.merge(plugin_routes.router);
            }
        }

        let middleware = self.collect_middleware(&plugin_context)?;
        api_router = apply_middleware(api_router, middleware);

        Ok(Router::new().nest("/api", api_router))
    }

    pub fn get_unified_openapi(&self) -> OpenApi {
        let mut combined = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title("Atrium")
                    .description(Some(
                        "Administration, impersonation and billing API for Atrium workspaces",
                    ))
                    .version(env!("CARGO_PKG_VERSION"))
                    .build(),
            )
            .servers(Some(vec![ServerBuilder::new()
                .url("/api")
                .description(Some("Base path for all API endpoints"))
                .build()]))
            .components(Some(
                ComponentsBuilder::new()
                    .security_scheme("bearer_auth", bearer_auth_scheme())
                    .build(),
            ))
            .build();

        for plugin in &self.plugins {
            if let Some(plugin_openapi) = plugin.openapi_schema() {
                debug!("Merging OpenAPI schema for plugin: {}", plugin.name());
                combined.merge(plugin_openapi);
            }
        }

        combined
    }

    /// Used to register core services (database, configuration) before plugins run.
    pub fn service_context(&self) -> &ServiceRegistrationContext {
        &self.context
    }

    fn collect_middleware(
        &self,
        plugin_context: &PluginContext,
    ) -> Result<Vec<PluginMiddleware>, PluginError> {
        let mut all_middleware = Vec::new();

        for plugin in &self.plugins {
            if let Some(collection) = plugin.configure_middleware(plugin_context)? {
                all_middleware.extend(collection.middleware);
            }
        }

        all_middleware.sort_by_key(|mw| mw.priority.value());
        for mw in &all_middleware {
            debug!(
                "  - {} (priority: {}) from {}",
                mw.name,
                mw.priority.value(),
                mw.plugin_name
            );
        }

        Ok(all_middleware)
    }
}

fn apply_middleware(mut router: Router, middleware: Vec<PluginMiddleware>) -> Router {
    // The last layer added is the outermost, so lowest priority values go on last.
    for mw in middleware.into_iter().rev() {
        debug!("Applying middleware: {} from plugin: {}", mw.name, mw.plugin_name);
        let handler = mw.handler.clone();
        router = router.layer(axum::middleware::from_fn(move |req: Request, next: Next| {
            let handler = handler.clone();
            async move { handler(req, next).await }
        }));
    }
    router
}

fn bearer_auth_scheme() -> SecurityScheme {
    let mut http_scheme = Http::new(HttpAuthScheme::Bearer);
    http_scheme.description =
        Some("Access token issued by the login token exchange. Format: `Bearer <token>`".to_string());
    SecurityScheme::Http(http_scheme)
}
