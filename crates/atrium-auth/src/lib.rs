mod auth_service;
pub mod context;
mod error;
pub mod handlers;
mod middleware;
mod permission_guard;
pub mod permissions;
mod plugin;
mod token_service;

pub use auth_service::{AuthService, AuthServiceError};
pub use context::*;
pub use error::AuthExceptionCode;
pub use middleware::*;
pub use permissions::*;
pub use plugin::AuthPlugin;
pub use token_service::{AuthToken, TokenClaims, TokenError, TokenService, TokenType};
