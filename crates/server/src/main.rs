//! Ladle server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};
use ladle_api::{AppState, auth_middleware, not_found, router as api_router, short_link_redirect};
use ladle_common::{Config, LocalStorage, StorageBackend};
use ladle_core::{
    FavoriteService, IngredientService, RecipeService, ShoppingCartService, ShoppingListService,
    SubscriptionService, UserService,
};
use ladle_db::repositories::{
    FavoriteRepository, IngredientRepository, RecipeRepository, ShoppingCartRepository,
    SubscriptionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ladle=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting ladle server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = ladle_db::connect(&config.database).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    ladle_db::migrate(&db).await?;
    info!("Migrations completed");

    // Uploaded images live on the local filesystem and are served under /media
    let media_url = format!("{}/media", config.server.url.trim_end_matches('/'));
    let storage: Arc<dyn StorageBackend> =
        Arc::new(LocalStorage::new(config.storage.path.clone(), media_url));

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let ingredient_repo = IngredientRepository::new(Arc::clone(&db));
    let recipe_repo = RecipeRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let shopping_cart_repo = ShoppingCartRepository::new(Arc::clone(&db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), Arc::clone(&storage));
    let ingredient_service = IngredientService::new(ingredient_repo.clone());
    let recipe_service = RecipeService::new(
        recipe_repo.clone(),
        ingredient_repo,
        user_repo.clone(),
        favorite_repo.clone(),
        shopping_cart_repo.clone(),
        subscription_repo.clone(),
        storage,
    );
    let favorite_service = FavoriteService::new(favorite_repo, recipe_repo.clone());
    let shopping_cart_service =
        ShoppingCartService::new(shopping_cart_repo.clone(), recipe_repo.clone());
    let shopping_list_service = ShoppingListService::new(shopping_cart_repo, recipe_repo.clone());
    let subscription_service = SubscriptionService::new(subscription_repo, user_repo, recipe_repo);

    // Create app state
    let state = AppState {
        user_service,
        ingredient_service,
        recipe_service,
        favorite_service,
        shopping_cart_service,
        shopping_list_service,
        subscription_service,
        server_url: config.server.url.clone(),
    };

    // Build router
    let app = Router::new()
        .route("/s/{id}", get(short_link_redirect))
        .nest("/api", api_router())
        .nest_service("/media", ServeDir::new(&config.storage.path))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // Recipe images arrive base64-encoded inside JSON bodies, so the
        // request limit has to leave room well past the image size itself.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(20 * 1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
