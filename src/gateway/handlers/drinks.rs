//! Drink endpoints

use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::Value;

use crate::auth::Claims;
use crate::drink::{DraftError, Drink, DrinkDraft, DrinkLong, DrinkShort};
use crate::error::{ApiError, ApiResult, ErrorEnvelope};

use super::super::state::AppState;
use super::super::types::{DeleteResponse, DrinkRequest, DrinksResponse};

/// List the menu
///
/// Public view: each ingredient shows only its colour and proportion.
#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "All drinks, short form", body = DrinksResponse<DrinkShort>),
        (status = 500, description = "Storage failure", body = ErrorEnvelope)
    ),
    tag = "Drinks"
)]
pub async fn list_drinks(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DrinksResponse<DrinkShort>>> {
    let drinks = state.drinks.list_all().await?;
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::short).collect(),
    )))
}

/// List the menu with full recipes
#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "All drinks, long form", body = DrinksResponse<DrinkLong>),
        (status = 400, description = "No headers sent", body = ErrorEnvelope),
        (status = 401, description = "Token rejected or lacks permission", body = ErrorEnvelope),
        (status = 500, description = "Storage failure", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = ["get:drinks-detail"])),
    tag = "Drinks"
)]
pub async fn list_drinks_detail(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DrinksResponse<DrinkLong>>> {
    let drinks = state.drinks.list_all().await?;
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::long).collect(),
    )))
}

/// Add a drink
#[utoipa::path(
    post,
    path = "/drinks",
    request_body = DrinkRequest,
    responses(
        (status = 200, description = "Created drink, long form", body = DrinksResponse<DrinkLong>),
        (status = 400, description = "Body is not a JSON object", body = ErrorEnvelope),
        (status = 401, description = "Token rejected or lacks permission", body = ErrorEnvelope),
        (status = 422, description = "Missing or invalid fields, or duplicate title", body = ErrorEnvelope),
        (status = 500, description = "Storage failure", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = ["post:drinks"])),
    tag = "Drinks"
)]
pub async fn create_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> ApiResult<Json<DrinksResponse<DrinkLong>>> {
    let draft = parse_draft(&body)?;
    let drink = state.drinks.insert(&draft.title, &draft.recipe).await?;
    tracing::info!(
        "Drink {} ({}) created by {}",
        drink.id,
        drink.title,
        claims.sub().unwrap_or("<no sub>")
    );
    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// Replace a drink's title and recipe
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink id")),
    request_body = DrinkRequest,
    responses(
        (status = 200, description = "Updated drink, long form", body = DrinksResponse<DrinkLong>),
        (status = 400, description = "Body is not a JSON object", body = ErrorEnvelope),
        (status = 401, description = "Token rejected or lacks permission", body = ErrorEnvelope),
        (status = 404, description = "No such drink", body = ErrorEnvelope),
        (status = 422, description = "Missing or invalid fields, or duplicate title", body = ErrorEnvelope),
        (status = 500, description = "Storage failure", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = ["patch:drinks"])),
    tag = "Drinks"
)]
pub async fn update_drink(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<DrinksResponse<DrinkLong>>> {
    // Existence first: an unknown id is 404 whatever the body holds.
    let mut drink = find_drink(&state, &id).await?;
    let draft = parse_draft(&body)?;

    drink.title = draft.title;
    drink.recipe = draft.recipe;
    state.drinks.update(&drink).await?;
    tracing::info!("Drink {} updated", drink.id);

    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// Remove a drink
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 401, description = "Token rejected or lacks permission", body = ErrorEnvelope),
        (status = 404, description = "No such drink", body = ErrorEnvelope),
        (status = 500, description = "Storage failure", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = ["delete:drinks"])),
    tag = "Drinks"
)]
pub async fn delete_drink(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let drink = find_drink(&state, &id).await?;
    state.drinks.delete(&drink).await?;
    tracing::info!("Drink {} ({}) deleted", drink.id, drink.title);
    Ok(Json(DeleteResponse::new(drink.id)))
}

/// Look up a drink by its raw path segment. Non-integer ids cannot exist.
async fn find_drink(state: &AppState, raw_id: &str) -> ApiResult<Drink> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::not_found("drink", raw_id))?;
    state
        .drinks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("drink", id))
}

/// Decode and validate a POST/PATCH body.
pub fn parse_draft(body: &[u8]) -> ApiResult<DrinkDraft> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::BadRequest)?;
    DrinkDraft::from_json(&value).map_err(|e| match e {
        DraftError::NotAnObject => ApiError::BadRequest,
        DraftError::MissingFields(fields) => ApiError::missing_fields(&fields),
        DraftError::InvalidTitle | DraftError::InvalidRecipe => ApiError::unprocessable(),
    })
}
