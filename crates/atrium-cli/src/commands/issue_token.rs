use std::sync::Arc;

use atrium_auth::{AuthService, TokenService};
use clap::Args;
use colored::Colorize;
use tracing::debug;
use uuid::Uuid;

use super::load_configuration;

#[derive(Args)]
pub struct IssueTokenCommand {
    /// Email of the user to sign in as
    #[arg(long)]
    pub email: String,

    /// Workspace the user is a member of
    #[arg(long)]
    pub workspace_id: Uuid,

    /// Database connection URL, overrides DATABASE_URL
    #[arg(long)]
    pub database_url: Option<String>,
}

impl IssueTokenCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let (_environment, config) = load_configuration(None, self.database_url)?;

        let rt = tokio::runtime::Runtime::new()?;
        let token = rt.block_on(async {
            let db = atrium_database::establish_connection(&config.database_url).await?;
            let token_service = Arc::new(TokenService::new(
                config.app_secret.clone(),
                config.login_token_expires_in_secs,
                config.access_token_expires_in_secs,
            ));
            let auth_service = AuthService::new(db, token_service);

            debug!("Issuing access token for {} on {}", self.email, self.workspace_id);
            auth_service
                .issue_access_token(&self.email.to_lowercase(), self.workspace_id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))
        })?;

        println!();
        println!("{}", "Access token issued".bright_green().bold());
        println!("{} {}", "Token:".bright_white().bold(), token.token);
        println!(
            "{} {}",
            "Expires at:".bright_white().bold(),
            token.expires_at.to_rfc3339()
        );
        println!();
        Ok(())
    }
}
