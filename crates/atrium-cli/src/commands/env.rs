use atrium_admin_panel::services::environment_groups::group_environment_variables;
use atrium_admin_panel::types::EnvironmentVariablesGroupData;
use atrium_config::{EnvironmentService, GROUP_METADATA};
use clap::Args;
use colored::Colorize;

const MASK: &str = "******";

#[derive(Args)]
pub struct EnvCommand {
    /// Print sensitive values instead of masking them
    #[arg(long)]
    pub show_sensitive: bool,
}

impl EnvCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let environment = EnvironmentService::from_process_env()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        let entries = environment
            .get_all()
            .iter()
            .map(|(name, entry)| (*name, entry));
        let groups = group_environment_variables(entries, &GROUP_METADATA)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        for group in &groups {
            println!();
            println!("{}", group.name.as_str().bright_cyan().bold());
            println!("{}", group.description.bright_white());
            for (name, value) in display_rows(group, self.show_sensitive) {
                println!("  {} = {}", name.bright_green(), value);
            }
        }
        println!();
        Ok(())
    }
}

/// `(name, value)` pairs of a group, sensitive values masked unless `show_sensitive`.
fn display_rows(group: &EnvironmentVariablesGroupData, show_sensitive: bool) -> Vec<(&str, &str)> {
    group
        .variables
        .iter()
        .map(|variable| {
            let value = if variable.sensitive && !show_sensitive && !variable.value.is_empty() {
                MASK
            } else {
                variable.value.as_str()
            };
            (variable.name.as_str(), value)
        })
        .collect()
}
