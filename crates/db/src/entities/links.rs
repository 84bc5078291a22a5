//! Shared shape of the user-to-recipe join tables.
//!
//! Favorites and shopping cart entries are structurally identical: a row
//! links one user to one recipe, at most once. [`UserRecipeLink`] captures
//! that shape so repositories and services can be written once and
//! instantiated per table.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use super::{favorite, shopping_cart_entry};

/// A join table linking users to recipes.
pub trait UserRecipeLink: EntityTrait {
    /// Active model used to insert a link row.
    type Link: ActiveModelTrait<Entity = Self> + Send;

    /// Noun used in duplicate / missing error messages.
    const RELATION_NAME: &'static str;

    /// Column holding the user id.
    fn user_id_column() -> Self::Column;

    /// Column holding the recipe id.
    fn recipe_id_column() -> Self::Column;

    /// Build a link row ready for insertion.
    fn link(id: String, user_id: String, recipe_id: String) -> Self::Link;

    /// Recipe id of an existing link row.
    fn recipe_id(model: &Self::Model) -> &str;
}

impl UserRecipeLink for favorite::Entity {
    type Link = favorite::ActiveModel;

    const RELATION_NAME: &'static str = "favorites";

    fn user_id_column() -> Self::Column {
        favorite::Column::UserId
    }

    fn recipe_id_column() -> Self::Column {
        favorite::Column::RecipeId
    }

    fn link(id: String, user_id: String, recipe_id: String) -> favorite::ActiveModel {
        favorite::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now().into()),
        }
    }

    fn recipe_id(model: &favorite::Model) -> &str {
        &model.recipe_id
    }
}

impl UserRecipeLink for shopping_cart_entry::Entity {
    type Link = shopping_cart_entry::ActiveModel;

    const RELATION_NAME: &'static str = "the shopping cart";

    fn user_id_column() -> Self::Column {
        shopping_cart_entry::Column::UserId
    }

    fn recipe_id_column() -> Self::Column {
        shopping_cart_entry::Column::RecipeId
    }

    fn link(id: String, user_id: String, recipe_id: String) -> shopping_cart_entry::ActiveModel {
        shopping_cart_entry::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now().into()),
        }
    }

    fn recipe_id(model: &shopping_cart_entry::Model) -> &str {
        &model.recipe_id
    }
}
