pub mod billing_subscriptions;
pub mod feature_flags;
pub mod types;
pub mod user_workspaces;
pub mod users;
pub mod workspaces;

pub use types::*;
