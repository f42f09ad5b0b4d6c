//! Drink Menu - coffee shop drinks API
//!
//! Public menu browsing plus permission-gated menu management, authorized by
//! RS256 bearer tokens checked against the identity provider's JWKS.
//!
//! # Modules
//!
//! - [`auth`] - Token verification and per-route permission guard
//! - [`drink`] - Drink records, projections and storage
//! - [`db`] - PostgreSQL pool and schema bootstrap
//! - [`error`] - API error envelope
//! - [`gateway`] - HTTP routes, application state, OpenAPI docs
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod auth;
pub mod config;
pub mod db;
pub mod drink;
pub mod error;
pub mod gateway;
pub mod logging;

pub use auth::{AuthError, AuthErrorCode, Claims, TokenVerifier};
pub use drink::{Drink, DrinkStore, MemoryDrinkStore, PgDrinkRepository, Recipe};
pub use error::{ApiError, ApiResult};
pub use gateway::{build_router, run_server, state::AppState};
