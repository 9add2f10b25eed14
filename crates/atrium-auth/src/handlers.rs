use crate::auth_service::{AuthService, AuthServiceError};
use crate::error::AuthExceptionCode;
use crate::token_service::AuthToken;
use atrium_core::error_builder::{bad_request, forbidden, internal_server_error, unauthorized};
use atrium_core::problemdetails::Problem;
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

pub struct AuthState {
    pub auth_service: Arc<AuthService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(exchange_login_token),
    components(schemas(LoginTokenExchangeRequest, AccessTokenResponse, AuthToken)),
    info(
        title = "Authentication API",
        description = "Exchange of short lived login tokens for access tokens",
        version = "1.0.0"
    ),
    tags((name = "Authentication", description = "Authentication endpoints"))
)]
pub struct AuthApiDoc;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginTokenExchangeRequest {
    pub login_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: AuthToken,
}

pub fn configure_routes() -> Router<Arc<AuthState>> {
    Router::new().route("/auth/login-token/exchange", post(exchange_login_token))
}

/// Exchange a login token for an access token
#[utoipa::path(
    post,
    path = "/auth/login-token/exchange",
    request_body = LoginTokenExchangeRequest,
    responses(
        (status = 200, description = "Access token issued", body = AccessTokenResponse),
        (status = 400, description = "User not found"),
        (status = 401, description = "Login token invalid or expired"),
        (status = 403, description = "User is not a member of the workspace"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn exchange_login_token(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<LoginTokenExchangeRequest>,
) -> Result<impl IntoResponse, Problem> {
    let access_token = state
        .auth_service
        .exchange_login_token(&request.login_token)
        .await?;

    info!("Login token exchanged for an access token");
    Ok(Json(AccessTokenResponse { access_token }))
}

impl From<AuthServiceError> for Problem {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidLoginToken(e) => unauthorized()
                .title("Invalid Login Token")
                .detail(e.to_string())
                .error_code(AuthExceptionCode::InvalidLoginToken)
                .build(),
            AuthServiceError::InvalidAccessToken(e) => unauthorized().detail(e.to_string()).build(),
            AuthServiceError::UserNotFound => bad_request()
                .title("User Not Found")
                .detail("User not found")
                .error_code(AuthExceptionCode::InvalidInput)
                .build(),
            AuthServiceError::NotAMember { .. } => forbidden()
                .detail(err.to_string())
                .error_code(AuthExceptionCode::ForbiddenException)
                .build(),
            AuthServiceError::TokenIssue(_) | AuthServiceError::Database(_) => {
                error!("Authentication failure: {}", err);
                internal_server_error().build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_service::TokenService;
    use atrium_database::test_utils::TestDatabase;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn app(test_db: &TestDatabase) -> (Router, Arc<AuthService>) {
        let auth_service = Arc::new(AuthService::new(
            test_db.connection_arc(),
            Arc::new(TokenService::new("test-secret", 900, 86400)),
        ));
        let router = configure_routes().with_state(Arc::new(AuthState {
            auth_service: auth_service.clone(),
        }));
        (router, auth_service)
    }

    fn exchange_request(login_token: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/login-token/exchange")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "loginToken": login_token }).to_string(),
            ))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_returns_access_token() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let user = test_db.create_user("jane@acme.dev", "Jane", "Doe").await?;
        let workspace = test_db.create_workspace(Some("Acme"), "acme", false).await?;
        test_db.add_member(user.id, workspace.id).await?;

        let (router, auth_service) = app(&test_db).await;
        let login = auth_service
            .token_service()
            .generate_login_token(&user.email, workspace.id)?;

        let response = router.oneshot(exchange_request(&login.token)).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let access_token = body["accessToken"]["token"].as_str().unwrap_or_default();
        assert!(auth_service.authenticate(access_token).await.is_ok());
        assert!(body["accessToken"]["expiresAt"].is_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_exchange_with_bad_token_is_unauthorized() -> anyhow::Result<()> {
        let test_db = TestDatabase::with_migrations().await?;
        let (router, _) = app(&test_db).await;

        let response = router.oneshot(exchange_request("garbage")).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error_code"], "INVALID_LOGIN_TOKEN");

        Ok(())
    }

    #[test]
    fn test_openapi_documents_exchange_route() {
        let doc = AuthApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/auth/login-token/exchange"));
    }
}
