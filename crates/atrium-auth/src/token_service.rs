//! Signed login and access tokens
//!
//! Tokens are HS256 JWTs. The signing key is derived per workspace and per token type
//! from the application secret, so a token minted for one workspace or purpose never
//! verifies for another.

use atrium_core::UtcDateTime;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Token has expired")]
    Expired,

    #[error("Expected a {expected} token")]
    WrongType { expected: TokenType },

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Login,
    Access,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Login => "LOGIN",
            TokenType::Access => "ACCESS",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Email for login tokens, user id for access tokens
    pub sub: String,
    pub workspace_id: Uuid,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

/// A signed token and the moment it stops being accepted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: String,
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: UtcDateTime,
}

pub struct TokenService {
    app_secret: String,
    login_token_ttl: Duration,
    access_token_ttl: Duration,
}

impl TokenService {
    pub fn new(app_secret: impl Into<String>, login_ttl_secs: i64, access_ttl_secs: i64) -> Self {
        Self {
            app_secret: app_secret.into(),
            login_token_ttl: Duration::seconds(login_ttl_secs),
            access_token_ttl: Duration::seconds(access_ttl_secs),
        }
    }

    pub fn generate_login_token(
        &self,
        email: &str,
        workspace_id: Uuid,
    ) -> Result<AuthToken, TokenError> {
        self.generate(email.to_string(), workspace_id, TokenType::Login, self.login_token_ttl)
    }

    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<AuthToken, TokenError> {
        self.generate(user_id.to_string(), workspace_id, TokenType::Access, self.access_token_ttl)
    }

    pub fn verify_login_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenType::Login)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenType::Access)
    }

    fn generate(
        &self,
        sub: String,
        workspace_id: Uuid,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<AuthToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = TokenClaims {
            sub,
            workspace_id,
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(AuthToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let secret = self.derive_secret(claims.workspace_id, claims.token_type);
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        // The workspace id selects the key, so read it before checking the signature.
        let unverified = peek_claims(token)?;
        if unverified.token_type != expected {
            return Err(TokenError::WrongType { expected });
        }

        let secret = self.derive_secret(unverified.workspace_id, expected);
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        Ok(data.claims)
    }

    fn derive_secret(&self, workspace_id: Uuid, token_type: TokenType) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.app_secret.as_bytes());
        hasher.update(workspace_id.to_string().as_bytes());
        hasher.update(token_type.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn peek_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Invalid(e.to_string()))
}
