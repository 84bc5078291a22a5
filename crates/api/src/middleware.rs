//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use ladle_core::{
    FavoriteService, IngredientService, RecipeService, ShoppingCartService, ShoppingListService,
    SubscriptionService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub ingredient_service: IngredientService,
    pub recipe_service: RecipeService,
    pub favorite_service: FavoriteService,
    pub shopping_cart_service: ShoppingCartService,
    pub shopping_list_service: ShoppingListService,
    pub subscription_service: SubscriptionService,
    /// Public URL of this instance, used when building absolute links.
    pub server_url: String,
}

/// Authentication middleware.
///
/// Resolves the `Authorization` header into a user model stored in the
/// request extensions. Both `Token <key>` and `Bearer <key>` schemes are
/// accepted. An invalid or absent token leaves the request anonymous;
/// handlers decide whether that is an error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract token from header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
            && let Some(token) = auth_str
                .strip_prefix("Token ")
                .or_else(|| auth_str.strip_prefix("Bearer ")) {
                // Authenticate user by token
                if let Ok(user) = state.user_service.authenticate_by_token(token).await {
                    req.extensions_mut().insert(user);
                }
            }

    next.run(req).await
}
