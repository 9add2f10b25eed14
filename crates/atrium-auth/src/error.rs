use std::fmt::Display;

/// Machine readable codes carried in the `error_code` member of auth problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthExceptionCode {
    InvalidInput,
    ForbiddenException,
    Unauthenticated,
    InvalidLoginToken,
}

impl AuthExceptionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthExceptionCode::InvalidInput => "INVALID_INPUT",
            AuthExceptionCode::ForbiddenException => "FORBIDDEN_EXCEPTION",
            AuthExceptionCode::Unauthenticated => "UNAUTHENTICATED",
            AuthExceptionCode::InvalidLoginToken => "INVALID_LOGIN_TOKEN",
        }
    }
}

impl Display for AuthExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for AuthExceptionCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
