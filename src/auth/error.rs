//! Authorization error types.
//!
//! Every failure of the permission guard or the token verifier is an
//! [`AuthError`]: a machine-readable code, a human description and the HTTP
//! status it maps to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Authorization failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// Request carried no headers at all
    MissingHeader,
    /// Authorization header absent, malformed, or token key unresolvable
    InvalidHeader,
    /// Token could not be decoded or its signature did not verify
    MalformedToken,
    /// Token `exp` is in the past
    TokenExpired,
    /// Issuer or audience did not match
    InvalidClaims,
    /// Verified payload has no `permissions` claim
    TokenMalformed,
    /// Required permission not granted
    Unauthorized,
    /// Signing keys could not be fetched
    KeysUnavailable,
}

impl AuthErrorCode {
    /// Wire name of the code.
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::InvalidHeader | Self::MalformedToken => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims => "invalid_claims",
            Self::TokenMalformed => "token_malformed",
            Self::Unauthorized => "unauthorized",
            Self::KeysUnavailable => "jwks_unavailable",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::MissingHeader | Self::MalformedToken => StatusCode::BAD_REQUEST,
            Self::KeysUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Authorization error with description.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {description}", code.name())]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub description: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// Create error with the default description for `code`.
    pub fn from_code(code: AuthErrorCode) -> Self {
        let description = match code {
            AuthErrorCode::MissingHeader => "No header is present",
            AuthErrorCode::InvalidHeader => "Authorization malformed",
            AuthErrorCode::MalformedToken => "Unable to parse authentication token.",
            AuthErrorCode::TokenExpired => "Token expired.",
            AuthErrorCode::InvalidClaims => {
                "Incorrect claims. Please, check the audience and issuer."
            }
            AuthErrorCode::TokenMalformed => "Permissions information missing from payload",
            AuthErrorCode::Unauthorized => "Token lack permission",
            AuthErrorCode::KeysUnavailable => "Unable to fetch signing keys",
        };
        Self::new(code, description)
    }

    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::Auth(self).into_response()
    }
}
