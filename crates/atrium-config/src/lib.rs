mod domain_manager;
pub mod environment;
pub mod plugin;
mod service;

pub use domain_manager::{DomainManagerError, DomainManagerService, WorkspaceUrls};
pub use environment::{
    EnvironmentEntry, EnvironmentError, EnvironmentService, EnvironmentValue,
    EnvironmentVariablesGroup, GroupMetadata, VariableMetadata, GROUP_METADATA,
};
pub use plugin::ConfigPlugin;
pub use service::{ConfigServiceError, ServerConfig};
