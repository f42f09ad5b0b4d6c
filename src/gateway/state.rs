use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::db::Database;
use crate::drink::DrinkStore;

/// Gateway application state, built once at startup and shared by every
/// handler.
#[derive(Clone)]
pub struct AppState {
    /// Drink repository (PostgreSQL or in-memory)
    pub drinks: Arc<dyn DrinkStore>,
    /// Bearer token verifier used by the permission gates
    pub verifier: Arc<TokenVerifier>,
    /// PostgreSQL pool, when configured (health checks)
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        drinks: Arc<dyn DrinkStore>,
        verifier: Arc<TokenVerifier>,
        pg_db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            drinks,
            verifier,
            pg_db,
        }
    }
}
