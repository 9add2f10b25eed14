use atrium_auth::{AuthExceptionCode, TokenError};
use atrium_config::{DomainManagerError, EnvironmentVariablesGroup};
use atrium_core::error_builder::{internal_server_error, not_found};
use atrium_core::problemdetails::Problem;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AdminPanelError {
    #[error("User not found")]
    UserNotFound,

    #[error("User not found or impersonation not enable on workspace")]
    ImpersonationNotAllowed,

    #[error("Workspace not found")]
    WorkspaceNotFound,

    #[error("No metadata registered for environment group {group}")]
    UnknownEnvironmentGroup { group: EnvironmentVariablesGroup },

    #[error("Failed to generate login token: {0}")]
    Token(#[from] TokenError),

    #[error("Failed to build workspace URLs: {0}")]
    Domain(#[from] DomainManagerError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<AdminPanelError> for Problem {
    fn from(err: AdminPanelError) -> Self {
        match err {
            AdminPanelError::UserNotFound
            | AdminPanelError::ImpersonationNotAllowed
            | AdminPanelError::WorkspaceNotFound => not_found()
                .detail(err.to_string())
                .error_code(AuthExceptionCode::InvalidInput)
                .build(),
            AdminPanelError::UnknownEnvironmentGroup { .. }
            | AdminPanelError::Token(_)
            | AdminPanelError::Domain(_)
            | AdminPanelError::Database(_) => {
                error!("Admin panel failure: {}", err);
                internal_server_error().build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_errors_carry_invalid_input_code() {
        let problem: Problem = AdminPanelError::ImpersonationNotAllowed.into();

        assert_eq!(problem.status_code, StatusCode::NOT_FOUND);
        assert_eq!(problem.error_code(), Some("INVALID_INPUT"));
        assert_eq!(
            problem.body.get("detail").and_then(|v| v.as_str()),
            Some("User not found or impersonation not enable on workspace")
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let problem: Problem = AdminPanelError::UnknownEnvironmentGroup {
            group: EnvironmentVariablesGroup::Logging,
        }
        .into();

        assert_eq!(problem.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(problem.error_code(), Some("INTERNAL_SERVER_ERROR"));
    }
}
