//! Config plugin: makes the environment catalog, server configuration and workspace
//! URL builder available to every other plugin.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use atrium_core::plugin::{AtriumPlugin, PluginError, ServiceRegistrationContext};

use crate::{DomainManagerService, EnvironmentService, ServerConfig};

pub struct ConfigPlugin {
    server_config: Arc<ServerConfig>,
    environment: Arc<EnvironmentService>,
}

impl ConfigPlugin {
    pub fn new(server_config: Arc<ServerConfig>, environment: Arc<EnvironmentService>) -> Self {
        Self {
            server_config,
            environment,
        }
    }
}

impl AtriumPlugin for ConfigPlugin {
    fn name(&self) -> &'static str {
        "config"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let domain_manager = Arc::new(DomainManagerService::from_config(&self.server_config));

            context.register_service(self.server_config.clone());
            context.register_service(self.environment.clone());
            context.register_service(domain_manager);

            tracing::debug!("Config plugin services registered successfully");
            Ok(())
        })
    }
}
