//! API endpoints.

mod auth;
mod ingredients;
mod recipes;
mod users;

use axum::Router;
use ladle_common::AppError;

use crate::middleware::AppState;

pub use recipes::short_link_redirect;

/// Create the API router.
///
/// The server nests this under `/api`. The short-link redirect lives at
/// the site root and is mounted separately via [`short_link_redirect`].
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/ingredients/", ingredients::router())
        .nest("/recipes/", recipes::router())
        .nest("/users/", users::router())
        .fallback(not_found)
}

/// Uniform JSON 404 for unmatched routes.
///
/// Installed as the fallback both here and on the server's root router,
/// so a missing route and a missing record are indistinguishable.
pub async fn not_found() -> AppError {
    AppError::NotFound("no matching route".to_string())
}
