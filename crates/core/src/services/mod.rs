//! Business logic services.

#![allow(missing_docs)]

pub mod ingredient;
pub mod media;
pub mod recipe;
pub mod recipe_relation;
pub mod shopping_list;
pub mod subscription;
pub mod user;

pub use ingredient::IngredientService;
pub use media::{DecodedImage, ImageFormat, decode_data_url};
pub use recipe::{
    CreateRecipeInput, IngredientAmount, IngredientLineView, RecipeDetail, RecipeListQuery,
    RecipeService, UpdateRecipeInput,
};
pub use recipe_relation::{FavoriteService, RecipeRelationService, ShoppingCartService};
pub use shopping_list::ShoppingListService;
pub use subscription::{AuthorFeed, SubscriptionService};
pub use user::{CreateUserInput, SetPasswordInput, UserService};
