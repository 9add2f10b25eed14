//! Billing plugin. Registers nothing unless billing is enabled.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use atrium_config::{DomainManagerService, EnvironmentService};
use atrium_core::plugin::{
    AtriumPlugin, PluginContext, PluginError, PluginRoutes, ServiceRegistrationContext,
};
use atrium_database::DbConnection;
use tracing::info;
use utoipa::openapi::OpenApi;
use utoipa::OpenApi as OpenApiTrait;

use crate::handlers::{self, BillingApiDoc, BillingState};
use crate::plan::BillingPlanService;
use crate::provider::StripeClient;
use crate::services::BillingPortalService;

#[derive(Default)]
pub struct BillingPlugin;

impl BillingPlugin {
    pub fn new() -> Self {
        Self
    }

    fn registration_error(&self, error: impl std::fmt::Display) -> PluginError {
        PluginError::PluginRegistrationFailed {
            plugin_name: self.name().to_string(),
            error: error.to_string(),
        }
    }
}

impl AtriumPlugin for BillingPlugin {
    fn name(&self) -> &'static str {
        "billing"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let environment = context.require_service::<EnvironmentService>()?;

            let enabled = environment
                .get_bool("IS_BILLING_ENABLED")
                .map_err(|e| self.registration_error(e))?;
            if !enabled {
                info!("Billing is disabled, skipping billing routes");
                return Ok(());
            }

            let db = context.require_service::<DbConnection>()?;
            let domain_manager = context.require_service::<DomainManagerService>()?;

            let api_key = environment
                .get_optional_string("BILLING_STRIPE_API_KEY")
                .map_err(|e| self.registration_error(e))?
                .ok_or_else(|| {
                    self.registration_error("BILLING_STRIPE_API_KEY is required when billing is enabled")
                })?;
            let base_url = environment
                .get_string("BILLING_STRIPE_BASE_URL")
                .map_err(|e| self.registration_error(e))?;
            let stripe = StripeClient::with_base_url(api_key, base_url)
                .map_err(|e| self.registration_error(e))?;

            let portal_service = Arc::new(BillingPortalService::new(
                db,
                Arc::new(stripe),
                domain_manager,
                environment.clone(),
            ));
            let plan_service = Arc::new(BillingPlanService::new(environment));

            context.register_service(portal_service.clone());
            context.register_service(plan_service.clone());
            context.register_service(Arc::new(BillingState {
                portal_service,
                plan_service,
            }));

            tracing::debug!("Billing plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Result<Option<PluginRoutes>, PluginError> {
        Ok(context
            .get_service::<BillingState>()
            .map(|state| PluginRoutes::new(handlers::configure_routes().with_state(state))))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(BillingApiDoc::openapi())
    }
}
