//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::error::{ApiError, ApiResult, ErrorEnvelope};

use super::super::state::AppState;
use super::super::types::HealthResponse;

/// Health check endpoint
///
/// Pings PostgreSQL when one is configured. Failure details are logged,
/// never returned.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = ErrorEnvelope)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let database = match &state.pg_db {
        Some(db) => {
            db.health_check().await.map_err(|e| {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                ApiError::Unavailable("postgres".to_string())
            })?;
            "postgres"
        }
        None => "memory",
    };

    Ok(Json(HealthResponse {
        success: true,
        database: database.to_string(),
        version: env!("GIT_HASH").to_string(),
    }))
}
