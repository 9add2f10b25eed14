use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::environment::{EnvironmentError, EnvironmentService};

#[derive(Error, Debug)]
pub enum ConfigServiceError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Invalid configuration: {details}")]
    InvalidConfiguration { details: String },
}

/// Settings the server needs at startup, derived from the environment catalog.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub database_url: String,
    pub app_secret: String,
    pub app_version: String,

    pub frontend_url: Url,
    pub is_multiworkspace_enabled: bool,
    pub default_subdomain: String,

    pub login_token_expires_in_secs: i64,
    pub access_token_expires_in_secs: i64,

    pub version_registry_url: String,

    // Fixed value
    pub api_base_url: String,
}

impl ServerConfig {
    pub fn from_environment(env: &EnvironmentService) -> Result<Self, ConfigServiceError> {
        let app_secret = env
            .get_optional_string("APP_SECRET")?
            .ok_or_else(|| ConfigServiceError::InvalidConfiguration {
                details: "APP_SECRET must be set".to_string(),
            })?
            .to_string();

        let frontend_url_raw = env.get_string("FRONTEND_URL")?;
        let frontend_url =
            Url::parse(frontend_url_raw).map_err(|e| ConfigServiceError::InvalidConfiguration {
                details: format!("FRONTEND_URL '{}' is not a valid URL: {}", frontend_url_raw, e),
            })?;

        let login_token_expires_in_secs = positive(env, "LOGIN_TOKEN_EXPIRES_IN_SECONDS")?;
        let access_token_expires_in_secs = positive(env, "ACCESS_TOKEN_EXPIRES_IN_SECONDS")?;

        Ok(ServerConfig {
            address: env.get_string("SERVER_ADDRESS")?.to_string(),
            database_url: env.get_string("DATABASE_URL")?.to_string(),
            app_secret,
            app_version: env.get_string("APP_VERSION")?.to_string(),
            frontend_url,
            is_multiworkspace_enabled: env.get_bool("IS_MULTIWORKSPACE_ENABLED")?,
            default_subdomain: env.get_string("DEFAULT_SUBDOMAIN")?.to_string(),
            login_token_expires_in_secs,
            access_token_expires_in_secs,
            version_registry_url: env.get_string("VERSION_REGISTRY_URL")?.to_string(),
            api_base_url: "/api".to_string(),
        })
    }

    /// Apply values given on the command line.
    pub fn with_overrides(mut self, address: Option<String>, database_url: Option<String>) -> Self {
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        self
    }

    pub fn is_sqlite(&self) -> bool {
        self.database_url.starts_with("sqlite:")
    }
}

fn positive(env: &EnvironmentService, name: &str) -> Result<i64, ConfigServiceError> {
    let value = env.get_number(name)?;
    if value <= 0 {
        return Err(ConfigServiceError::InvalidConfiguration {
            details: format!("{} must be greater than zero, got {}", name, value),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> EnvironmentService {
        EnvironmentService::load(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .unwrap()
    }

    #[test]
    fn test_from_environment_with_defaults() {
        let config = ServerConfig::from_environment(&env(&[("APP_SECRET", "s3cr3t")])).unwrap();

        assert_eq!(config.address, "0.0.0.0:3000");
        assert_eq!(config.app_secret, "s3cr3t");
        assert_eq!(config.frontend_url.as_str(), "http://localhost:3001/");
        assert_eq!(config.login_token_expires_in_secs, 900);
        assert_eq!(config.access_token_expires_in_secs, 86400);
        assert!(config.is_sqlite());
    }

    #[test]
    fn test_missing_app_secret_is_rejected() {
        let err = ServerConfig::from_environment(&env(&[])).unwrap_err();
        assert!(matches!(err, ConfigServiceError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_invalid_frontend_url_is_rejected() {
        let err = ServerConfig::from_environment(&env(&[
            ("APP_SECRET", "s3cr3t"),
            ("FRONTEND_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FRONTEND_URL"));
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let err = ServerConfig::from_environment(&env(&[
            ("APP_SECRET", "s3cr3t"),
            ("LOGIN_TOKEN_EXPIRES_IN_SECONDS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("LOGIN_TOKEN_EXPIRES_IN_SECONDS"));
    }

    #[test]
    fn test_overrides_win() {
        let config = ServerConfig::from_environment(&env(&[("APP_SECRET", "s3cr3t")]))
            .unwrap()
            .with_overrides(
                Some("127.0.0.1:9000".to_string()),
                Some("postgresql://localhost/atrium".to_string()),
            );

        assert_eq!(config.address, "127.0.0.1:9000");
        assert!(!config.is_sqlite());
    }
}
