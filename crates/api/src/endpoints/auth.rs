//! Token authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use ladle_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState};

/// Token login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token login response.
#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

/// Issue an access token for valid credentials.
///
/// The token is created on first login and reused on later logins until
/// the user logs out.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let auth_token = state.user_service.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse { auth_token }))
}

/// Destroy the caller's access token.
async fn logout(AuthUser(user): AuthUser, State(state): State<AppState>) -> AppResult<StatusCode> {
    state.user_service.logout(&user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token/login/", post(login))
        .route("/token/logout/", post(logout))
}
