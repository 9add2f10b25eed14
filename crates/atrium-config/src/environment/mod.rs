//! Configuration catalog: variable definitions, their groups and the resolved values

mod catalog;
mod groups;
mod service;

pub use catalog::{VariableDefinition, VariableKind, CATALOG, DEFAULT_VERSION_REGISTRY_URL};
pub use groups::{EnvironmentVariablesGroup, GroupMetadata, GROUP_METADATA};
pub use service::{
    EnvironmentEntry, EnvironmentError, EnvironmentService, EnvironmentValue, VariableMetadata,
};
