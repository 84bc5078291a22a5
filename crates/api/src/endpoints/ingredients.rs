//! Ingredient catalog endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ladle_common::AppResult;
use ladle_db::entities::ingredient;
use serde::Deserialize;

use crate::middleware::AppState;

/// Ingredient listing query.
#[derive(Debug, Default, Deserialize)]
pub struct ListIngredientsQuery {
    /// Name prefix to filter by.
    pub name: Option<String>,
}

/// List catalog ingredients, name ascending, without pagination.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
) -> AppResult<Json<Vec<ingredient::Model>>> {
    let ingredients = state.ingredient_service.list(query.name.as_deref()).await?;

    Ok(Json(ingredients))
}

/// Fetch a single catalog ingredient.
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ingredient::Model>> {
    let ingredient = state.ingredient_service.get(&id).await?;

    Ok(Json(ingredient))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/", get(get_one))
}
