pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn_with_state, map_response},
    routing::{MethodRouter, delete, get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{PermissionGate, permissions, require_permission};
use crate::config::GatewayConfig;
use state::AppState;

/// Largest accepted request body. Recipes are small.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Put `method_router` behind a permission check.
fn gated(
    state: &AppState,
    permission: &'static str,
    method_router: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    let gate = PermissionGate::new(state.verifier.clone(), permission);
    method_router.route_layer(from_fn_with_state(gate, require_permission))
}

/// Build the complete application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let drinks = get(handlers::list_drinks).merge(gated(
        &state,
        permissions::POST_DRINKS,
        post(handlers::create_drink),
    ));

    let drinks_detail = gated(
        &state,
        permissions::GET_DRINKS_DETAIL,
        get(handlers::list_drinks_detail),
    );

    let drink_by_id = gated(
        &state,
        permissions::PATCH_DRINKS,
        patch(handlers::update_drink),
    )
    .merge(gated(
        &state,
        permissions::DELETE_DRINKS,
        delete(handlers::delete_drink),
    ));

    Router::new()
        .route("/drinks", drinks)
        .route("/drinks-detail", drinks_detail)
        .route("/drinks/{id}", drink_by_id)
        .route("/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(map_response(handlers::envelope_rejections))
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port in use?)", addr))?;

    tracing::info!("Drink menu listening on http://{}", addr);
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
