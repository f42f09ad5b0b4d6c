//! API error envelope.
//!
//! Every failure leaves the service as
//! `{"success": false, "error": <status>, "message": <text>}`;
//! authorization failures also carry `"code"`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::drink::StorageError;

pub const BAD_REQUEST_MESSAGE: &str = "Problems parsing JSON";
pub const UNPROCESSABLE_MESSAGE: &str = "Error processing request";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Uniform error body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(example = false)]
    pub success: bool,
    /// HTTP status code, repeated in the body
    #[schema(example = 404)]
    pub error: u16,
    #[schema(example = "drink with id 7 not found")]
    pub message: String,
    /// Authorization error code (auth failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "invalid_header")]
    pub code: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body is not valid JSON
    #[error("{}", BAD_REQUEST_MESSAGE)]
    BadRequest,

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Unprocessable(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("storage failure: {0}")]
    Storage(#[source] StorageError),

    /// No route matched
    #[error("resource not found")]
    RouteNotFound,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Handler panicked; detail is logged only
    #[error("internal error: {0}")]
    Internal(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request body too large")]
    PayloadTooLarge,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unprocessable() -> Self {
        Self::Unprocessable(UNPROCESSABLE_MESSAGE.to_string())
    }

    /// 422 listing the required fields absent from the body.
    pub fn missing_fields(fields: &[&str]) -> Self {
        let quoted: Vec<String> = fields.iter().map(|f| format!("'{}'", f)).collect();
        Self::Unprocessable(format!(
            "Required field(s) missing from request body: [{}]",
            quoted.join(", ")
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Auth(e) => e.status(),
            Self::Storage(StorageError::DuplicateTitle(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        let status = self.status();
        let (message, code) = match self {
            Self::Auth(e) => (e.description.clone(), Some(e.code.name())),
            Self::Storage(e @ StorageError::DuplicateTitle(_)) => (e.to_string(), None),
            Self::Storage(_) | Self::Internal(_) => (INTERNAL_MESSAGE.to_string(), None),
            Self::Unavailable(_) => ("service unavailable".to_string(), None),
            other => (other.to_string(), None),
        };
        ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message,
            code,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        if !matches!(e, StorageError::DuplicateTitle(_)) {
            tracing::error!("Storage failure: {:?}", e);
        }
        Self::Storage(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Auth(e) = &self {
            tracing::warn!("Authorization rejected: {}", e);
        }
        (status, Json(self.envelope())).into_response()
    }
}
