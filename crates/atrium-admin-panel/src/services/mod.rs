mod admin_panel_service;
pub mod environment_groups;
pub mod feature_flags;
pub mod version;

pub use admin_panel_service::{lookup_predicate, AdminPanelService, LookupPredicate};
pub use version::{VersionCheckError, VersionRegistryClient};
