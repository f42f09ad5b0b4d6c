//! Drinks: the menu's single resource.
//!
//! - `models`: records, short/long projections, request body validation
//! - `repository`: the [`DrinkStore`] boundary and its PostgreSQL implementation
//! - `memory`: in-process store for database-less runs and tests

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

pub use error::StorageError;
pub use memory::MemoryDrinkStore;
pub use models::{
    DraftError, Drink, DrinkDraft, DrinkLong, DrinkShort, Ingredient, Recipe, ShortIngredient,
};
pub use repository::{DrinkStore, PgDrinkRepository};

use serde_json::json;

/// Put the demo `water` drink on an empty menu. Returns whether it was added.
pub async fn seed_demo_drink(store: &dyn DrinkStore) -> Result<bool, StorageError> {
    if !store.list_all().await?.is_empty() {
        return Ok(false);
    }
    let recipe: Recipe =
        serde_json::from_value(json!([{"name": "water", "color": "blue", "parts": 1}]))?;
    let drink = store.insert("water", &recipe).await?;
    tracing::info!("Seeded demo drink {} ({})", drink.id, drink.title);
    Ok(true)
}
