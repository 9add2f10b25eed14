//! Back-office operations for platform administrators
//!
//! Impersonation, user lookup across workspaces, the grouped configuration overview,
//! the release check and per-workspace feature flag overrides.

mod error;
pub mod handlers;
mod plugin;
pub mod services;
pub mod types;

pub use error::AdminPanelError;
pub use plugin::AdminPanelPlugin;
pub use services::{AdminPanelService, VersionCheckError, VersionRegistryClient};
