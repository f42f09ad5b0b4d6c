//! Request and response bodies of the drink routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::drink::Ingredient;

/// Body of `POST /drinks` and `PATCH /drinks/{id}`.
///
/// Documentation and client-side type only: the handlers validate the raw
/// JSON themselves so each failure gets its own status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrinkRequest {
    #[schema(example = "Water")]
    pub title: String,
    #[schema(value_type = Vec<Object>, example = json!([{"name": "Water", "color": "blue", "parts": 1}]))]
    pub recipe: Vec<Ingredient>,
}

/// `{"success": true, "drinks": [...]}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// `{"success": true, "delete": <id>}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    #[schema(example = 1)]
    pub delete: i64,
}

impl DeleteResponse {
    pub fn new(id: i64) -> Self {
        Self {
            success: true,
            delete: id,
        }
    }
}

/// Health check body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    /// `postgres` or `memory`
    #[schema(example = "postgres")]
    pub database: String,
    /// Build revision
    #[schema(example = "3f2a9c1")]
    pub version: String,
}
