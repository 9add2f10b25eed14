use atrium_entities::workspaces;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

use crate::ServerConfig;

#[derive(Error, Debug)]
pub enum DomainManagerError {
    #[error("Cannot build a URL for host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
}

/// Public URLs a workspace is reachable at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceUrls {
    pub custom_url: Option<String>,
    pub subdomain_url: String,
}

/// Builds the URLs of the web application for a given workspace.
pub struct DomainManagerService {
    frontend_url: Url,
    is_multiworkspace_enabled: bool,
}

impl DomainManagerService {
    pub fn new(frontend_url: Url, is_multiworkspace_enabled: bool) -> Self {
        Self {
            frontend_url,
            is_multiworkspace_enabled,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.frontend_url.clone(), config.is_multiworkspace_enabled)
    }

    /// Frontend base URL, on the workspace subdomain when multi-workspace is on.
    pub fn build_workspace_url(
        &self,
        workspace: &workspaces::Model,
    ) -> Result<Url, DomainManagerError> {
        let mut url = self.frontend_url.clone();

        if self.is_multiworkspace_enabled {
            let base_host = url.host_str().unwrap_or_default();
            let host = format!("{}.{}", workspace.subdomain, base_host);
            url.set_host(Some(&host))
                .map_err(|e| DomainManagerError::InvalidHost {
                    host: host.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(url)
    }

    pub fn build_workspace_url_with_path(
        &self,
        workspace: &workspaces::Model,
        path: Option<&str>,
    ) -> Result<Url, DomainManagerError> {
        let mut url = self.build_workspace_url(workspace)?;
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            url.set_path(path);
        }
        Ok(url)
    }

    pub fn get_workspace_urls(
        &self,
        workspace: &workspaces::Model,
    ) -> Result<WorkspaceUrls, DomainManagerError> {
        let custom_url = match workspace.custom_domain.as_deref() {
            Some(domain) if workspace.is_custom_domain_enabled && !domain.is_empty() => {
                let url = Url::parse(&format!("https://{}", domain)).map_err(|e| {
                    DomainManagerError::InvalidHost {
                        host: domain.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Some(url.to_string())
            }
            _ => None,
        };

        Ok(WorkspaceUrls {
            custom_url,
            subdomain_url: self.build_workspace_url(workspace)?.to_string(),
        })
    }
}
