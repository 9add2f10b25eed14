use crate::{auth_service::AuthService, context::AuthContext};
use atrium_core::error_builder::unauthorized;
use atrium_core::problemdetails::Problem;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Attach an [`AuthContext`] to requests carrying a valid access token.
///
/// Requests without one pass through untouched; [`RequireAuth`] rejects them on routes
/// that need a caller.
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match auth_service.authenticate(token).await {
            Ok(auth_context) => {
                req.extensions_mut().insert(auth_context);
            }
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
            }
        }
    }

    next.run(req).await
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for handlers that require an authenticated caller
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| unauthorized().build())
    }
}
