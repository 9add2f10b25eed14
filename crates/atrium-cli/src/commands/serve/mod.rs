mod app;
mod shutdown;

use clap::Args;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub use app::{build_application, build_plugin_manager};
pub use shutdown::shutdown_signal;

use super::load_configuration;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to, overrides SERVER_ADDRESS
    #[arg(long)]
    pub address: Option<String>,

    /// Database connection URL, overrides DATABASE_URL
    #[arg(long)]
    pub database_url: Option<String>,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let (environment, config) = load_configuration(self.address, self.database_url)?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async move {
            debug!("Initializing database connection...");
            let db = atrium_database::establish_connection(&config.database_url).await?;

            let plugin_manager = build_plugin_manager(config.clone(), environment, db).await?;
            let app = build_application(&plugin_manager)?;

            let listener = TcpListener::bind(&config.address).await?;
            info!("Atrium {} listening on {}", config.app_version, config.address);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("Server exited");
            Ok::<(), anyhow::Error>(())
        })
    }
}
