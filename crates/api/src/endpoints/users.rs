//! User profile, subscription and avatar endpoints.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use ladle_common::{AppError, AppResult};
use ladle_core::{AuthorFeed, CreateUserInput, SetPasswordInput};
use ladle_db::entities::user;
use serde::{Deserialize, Serialize};

use super::recipes::RecipeShortResponse;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    pagination::{self, Paginated},
};

/// User profile response.
#[derive(Serialize)]
pub struct UserProfileResponse {
    pub email: String,
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserProfileResponse {
    /// Render a user with a precomputed `is_subscribed` flag.
    pub fn from_user(user: user::Model, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
            avatar: user.avatar_url,
        }
    }
}

/// Signup response. The password never appears here.
#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub email: String,
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for CreatedUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Followed author with an embedded recipe slice.
#[derive(Serialize)]
pub struct SubscriptionEntryResponse {
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: u64,
    #[serde(flatten)]
    pub profile: UserProfileResponse,
}

impl From<AuthorFeed> for SubscriptionEntryResponse {
    fn from(entry: AuthorFeed) -> Self {
        Self {
            recipes: entry.recipes.into_iter().map(Into::into).collect(),
            recipes_count: entry.recipes_count,
            // By construction the viewer follows every listed author.
            profile: UserProfileResponse::from_user(entry.author, true),
        }
    }
}

/// User listing query.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Subscription feed query.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub recipes_limit: Option<String>,
}

/// Avatar update request.
#[derive(Debug, Deserialize)]
pub struct SetAvatarRequest {
    pub avatar: Option<String>,
}

/// Avatar update response.
#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Subscribe query, shared by the subscribe action.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<String>,
}

/// List users, username ascending, with limit/offset pagination.
async fn list(
    maybe_user: MaybeAuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<Paginated<UserProfileResponse>>> {
    let limit = pagination::limit_param(query.limit.as_deref());
    let offset = pagination::offset_param(query.offset.as_deref());

    let (count, users) = state.user_service.list(limit, offset).await?;
    let subscribed = subscribed_set(&state, maybe_user.viewer_id()).await?;

    let results = users
        .into_iter()
        .map(|u| {
            let is_subscribed = subscribed.contains(&u.id);
            UserProfileResponse::from_user(u, is_subscribed)
        })
        .collect();

    let url = pagination::request_url(&state.server_url, &uri)?;
    Ok(Json(Paginated::by_slice(&url, count, limit, offset, results)))
}

/// Register a new account.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<CreatedUserResponse>)> {
    let user = state.user_service.create(input).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get the authenticated user's own profile.
async fn me(AuthUser(user): AuthUser) -> Json<UserProfileResponse> {
    // Self-subscriptions cannot exist, so the flag is always false here.
    Json(UserProfileResponse::from_user(user, false))
}

/// Change the authenticated user's password.
async fn set_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SetPasswordInput>,
) -> AppResult<StatusCode> {
    state.user_service.set_password(&user.id, input).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the authors the authenticated user follows, enriched with a
/// recipe slice per author.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SubscriptionsQuery>,
) -> AppResult<Json<Paginated<SubscriptionEntryResponse>>> {
    let limit = pagination::limit_param(query.limit.as_deref());
    let offset = pagination::offset_param(query.offset.as_deref());
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

    let (count, entries) = state
        .subscription_service
        .feed(&user.id, limit, offset, recipes_limit)
        .await?;

    let results = entries.into_iter().map(Into::into).collect();
    let url = pagination::request_url(&state.server_url, &uri)?;
    Ok(Json(Paginated::by_slice(&url, count, limit, offset, results)))
}

/// Fetch a user's public profile.
async fn get_one(
    maybe_user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserProfileResponse>> {
    let user = state.user_service.get(&id).await?;

    let is_subscribed = match maybe_user.viewer_id() {
        Some(viewer) => {
            state
                .subscription_service
                .is_subscribed(viewer, &user.id)
                .await?
        }
        None => false,
    };

    Ok(Json(UserProfileResponse::from_user(user, is_subscribed)))
}

/// Set the authenticated user's avatar.
///
/// The path id is accepted for routing compatibility but the avatar is
/// always the caller's own; `/users/me/avatar/` works the same way.
async fn set_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(_id): Path<String>,
    Json(req): Json<SetAvatarRequest>,
) -> AppResult<Json<AvatarResponse>> {
    let data_url = req
        .avatar
        .ok_or_else(|| AppError::Validation("Avatar must not be empty.".to_string()))?;

    let avatar = state.user_service.set_avatar(&user.id, &data_url).await?;

    Ok(Json(AvatarResponse { avatar }))
}

/// Remove the authenticated user's avatar.
async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(_id): Path<String>,
) -> AppResult<StatusCode> {
    state.user_service.clear_avatar(&user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Follow an author.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SubscribeQuery>,
) -> AppResult<(StatusCode, Json<SubscriptionEntryResponse>)> {
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

    let entry = state
        .subscription_service
        .subscribe(&user.id, &id, recipes_limit)
        .await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Unfollow an author.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.subscription_service.unsubscribe(&user.id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// IDs of the authors the viewer follows, empty for anonymous viewers.
async fn subscribed_set(
    state: &AppState,
    viewer_id: Option<&str>,
) -> AppResult<HashSet<String>> {
    match viewer_id {
        Some(id) => Ok(state
            .subscription_service
            .subscribed_ids(id)
            .await?
            .into_iter()
            .collect()),
        None => Ok(HashSet::new()),
    }
}

/// `recipes_limit` is best-effort: anything that is not a number means
/// no limit.
fn parse_recipes_limit(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.parse::<u64>().ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/me/", get(me))
        .route("/set_password/", post(set_password))
        .route("/subscriptions/", get(subscriptions))
        .route("/{id}/", get(get_one))
        .route("/{id}/avatar/", put(set_avatar).delete(delete_avatar))
        .route("/{id}/subscribe/", post(subscribe).delete(unsubscribe))
}
