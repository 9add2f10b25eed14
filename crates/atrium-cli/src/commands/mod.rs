pub mod env;
pub mod issue_token;
pub mod serve;

pub use env::EnvCommand;
pub use issue_token::IssueTokenCommand;
pub use serve::ServeCommand;

use std::sync::Arc;

use atrium_config::{EnvironmentService, ServerConfig};

/// Resolve the environment catalog and the server configuration derived from it.
pub fn load_configuration(
    address: Option<String>,
    database_url: Option<String>,
) -> anyhow::Result<(Arc<EnvironmentService>, Arc<ServerConfig>)> {
    let environment = EnvironmentService::from_process_env()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    let config = ServerConfig::from_environment(&environment)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?
        .with_overrides(address, database_url);

    Ok((Arc::new(environment), Arc::new(config)))
}
