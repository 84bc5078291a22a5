//! Recipe endpoints: listing, authoring, favorites, shopping cart and
//! the downloadable shopping list.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use ladle_common::AppResult;
use ladle_core::{CreateRecipeInput, RecipeDetail, RecipeListQuery, UpdateRecipeInput};
use ladle_db::entities::recipe;
use serde::{Deserialize, Serialize};

use super::users::UserProfileResponse;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    pagination::{self, Paginated},
};

/// Expanded ingredient line of a recipe response. The `id` is the
/// catalog ingredient's id, not the line's.
#[derive(Serialize)]
pub struct IngredientLineResponse {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe response.
#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: String,
    pub author: UserProfileResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.recipe.id,
            author: UserProfileResponse::from_user(detail.author, detail.author_is_subscribed),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(|line| IngredientLineResponse {
                    id: line.ingredient_id,
                    name: line.name,
                    measurement_unit: line.measurement_unit,
                    amount: line.amount,
                })
                .collect(),
            is_favorited: detail.is_favorited,
            is_in_shopping_cart: detail.is_in_shopping_cart,
            name: detail.recipe.name,
            image: detail.recipe.image_url,
            text: detail.recipe.text,
            cooking_time: detail.recipe.cooking_time,
        }
    }
}

/// Short recipe shape used by relation toggles and subscription feeds.
#[derive(Serialize)]
pub struct RecipeShortResponse {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<recipe::Model> for RecipeShortResponse {
    fn from(recipe: recipe::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image_url,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short link payload.
#[derive(Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Recipe listing query.
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// List recipes, oldest first, with page-number pagination.
async fn list(
    maybe_user: MaybeAuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListRecipesQuery>,
) -> AppResult<Json<Paginated<RecipeResponse>>> {
    let page = pagination::page_param(query.page.as_deref())?;
    let limit = pagination::limit_param(query.limit.as_deref());

    let filter = RecipeListQuery {
        author_id: query.author.clone(),
        favorited: flag_param(query.is_favorited.as_deref()),
        in_cart: flag_param(query.is_in_shopping_cart.as_deref()),
    };

    let (count, details) = state
        .recipe_service
        .list(maybe_user.viewer_id(), &filter, limit, (page - 1) * limit)
        .await?;

    let results = details.into_iter().map(RecipeResponse::from).collect();
    let url = pagination::request_url(&state.server_url, &uri)?;
    Ok(Json(Paginated::by_page(&url, count, page, limit, results)?))
}

/// Publish a new recipe.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<(StatusCode, Json<RecipeResponse>)> {
    let detail = state.recipe_service.create(&user.id, input).await?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// Fetch a recipe with viewer-relative flags.
async fn get_one(
    maybe_user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RecipeResponse>> {
    let detail = state
        .recipe_service
        .get_detail(maybe_user.viewer_id(), &id)
        .await?;

    Ok(Json(detail.into()))
}

/// Update a recipe. Author only; the ingredient line set is replaced
/// wholesale.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<Json<RecipeResponse>> {
    let detail = state.recipe_service.update(&user.id, &id, input).await?;

    Ok(Json(detail.into()))
}

/// Delete a recipe. Author only.
async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.recipe_service.delete(&user.id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Download the aggregated shopping list as a plain-text attachment.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let report = state.shopping_list_service.build_report(&user.id).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"shopping_list.txt\"",
        ),
    ];

    Ok((headers, report).into_response())
}

/// Add a recipe to the caller's favorites.
async fn favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<RecipeShortResponse>)> {
    let recipe = state.favorite_service.add(&user.id, &id).await?;

    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// Remove a recipe from the caller's favorites.
async fn unfavorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.favorite_service.remove(&user.id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the caller's shopping cart.
async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<RecipeShortResponse>)> {
    let recipe = state.shopping_cart_service.add(&user.id, &id).await?;

    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// Remove a recipe from the caller's shopping cart.
async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.shopping_cart_service.remove(&user.id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Build the short link for a recipe.
async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ShortLinkResponse>> {
    let recipe = state.recipe_service.get(&id).await?;

    let short_link = format!(
        "{}/s/{}",
        state.server_url.trim_end_matches('/'),
        recipe.id
    );

    Ok(Json(ShortLinkResponse { short_link }))
}

/// Redirect a short recipe link to the recipe page.
///
/// Mounted at the site root (`/s/{id}`), outside the `/api` prefix.
pub async fn short_link_redirect(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let recipe = state.recipe_service.get(&id).await?;

    Ok(Redirect::to(&format!("/recipes/{}", recipe.id)))
}

/// Boolean query flags accept `1` or `true`.
fn flag_param(raw: Option<&str>) -> bool {
    matches!(raw, Some("1" | "true"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart/", get(download_shopping_cart))
        .route("/{id}/", get(get_one).patch(update).delete(delete_recipe))
        .route("/{id}/favorite/", post(favorite).delete(unfavorite))
        .route("/{id}/shopping_cart/", post(add_to_cart).delete(remove_from_cart))
        .route("/{id}/get-link/", get(get_link))
}
