//! Database repositories.
//!
//! Repositories wrap a shared [`DatabaseConnection`](sea_orm::DatabaseConnection)
//! and expose the queries the service layer needs. They translate every
//! `DbErr` into [`AppError`](ladle_common::AppError) so nothing above this
//! layer touches sea-orm error types.

pub mod ingredient;
pub mod recipe;
pub mod subscription;
pub mod user;
pub mod user_recipe_link;

pub use ingredient::IngredientRepository;
pub use recipe::{IngredientTotal, RecipeListFilter, RecipeRepository};
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
pub use user_recipe_link::{FavoriteRepository, ShoppingCartRepository, UserRecipeLinkRepository};
