//! User-recipe relation toggles.
//!
//! Favorites and the shopping cart behave identically: a join row per
//! (user, recipe) pair, added and removed by toggle requests. One
//! generic service covers both, parameterized over the link entity.

use ladle_common::{AppError, AppResult, IdGenerator};
use ladle_db::{
    entities::{Favorite, ShoppingCartEntry, UserRecipeLink, recipe},
    repositories::{RecipeRepository, UserRecipeLinkRepository},
};
use sea_orm::IntoActiveModel;

/// Generic toggle service over a user-recipe link entity.
pub struct RecipeRelationService<E: UserRecipeLink> {
    link_repo: UserRecipeLinkRepository<E>,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

/// Favorite toggle service.
pub type FavoriteService = RecipeRelationService<Favorite>;

/// Shopping cart toggle service.
pub type ShoppingCartService = RecipeRelationService<ShoppingCartEntry>;

impl<E: UserRecipeLink> Clone for RecipeRelationService<E> {
    fn clone(&self) -> Self {
        Self {
            link_repo: self.link_repo.clone(),
            recipe_repo: self.recipe_repo.clone(),
            id_gen: self.id_gen.clone(),
        }
    }
}

impl<E: UserRecipeLink> RecipeRelationService<E> {
    /// Create a new relation service.
    #[must_use]
    pub const fn new(
        link_repo: UserRecipeLinkRepository<E>,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            link_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add the recipe to the user's relation.
    ///
    /// Returns the recipe so the caller can render its short shape.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<recipe::Model>
    where
        E::Model: IntoActiveModel<E::Link>,
    {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.link_repo.exists(user_id, recipe_id).await? {
            return Err(AppError::Validation(format!(
                "Recipe is already in {}.",
                E::RELATION_NAME
            )));
        }

        let link = E::link(
            self.id_gen.generate(),
            user_id.to_string(),
            recipe_id.to_string(),
        );
        self.link_repo.create(link).await?;

        Ok(recipe)
    }

    /// Remove the recipe from the user's relation.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        let deleted = self.link_repo.delete_by_pair(user_id, recipe_id).await?;
        if deleted == 0 {
            return Err(AppError::Validation(format!(
                "Recipe is not in {}.",
                E::RELATION_NAME
            )));
        }

        Ok(())
    }

    /// Check whether the pair is linked.
    pub async fn contains(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.link_repo.exists(user_id, recipe_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ladle_db::entities::favorite;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_recipe(id: &str, author_id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            name: "Пирог".to_string(),
            image_url: "http://localhost/media/p.jpg".to_string(),
            text: "Mix and bake.".to_string(),
            cooking_time: 30,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_favorite(id: &str, user_id: &str, recipe_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_add_missing_recipe() {
        let link_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let service = FavoriteService::new(
            UserRecipeLinkRepository::new(link_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.add("u1", "missing").await;
        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_duplicate() {
        let link_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_favorite("f1", "u1", "r1")]])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1", "author")]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            UserRecipeLinkRepository::new(link_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.add("u1", "r1").await;
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Recipe is already in favorites.");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_creates_link() {
        let link_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1", "author")]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            UserRecipeLinkRepository::new(link_db),
            RecipeRepository::new(recipe_db),
        );

        let recipe = service.add("u1", "r1").await.unwrap();
        assert_eq!(recipe.id, "r1");
    }

    #[tokio::test]
    async fn test_remove_not_linked() {
        let link_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1", "author")]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            UserRecipeLinkRepository::new(link_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.remove("u1", "r1").await;
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Recipe is not in favorites.");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_deletes_link() {
        let link_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1", "author")]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            UserRecipeLinkRepository::new(link_db),
            RecipeRepository::new(recipe_db),
        );

        assert!(service.remove("u1", "r1").await.is_ok());
    }

    #[tokio::test]
    async fn test_cart_message_wording() {
        let link_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_recipe("r1", "author")]])
                .into_connection(),
        );

        let service = ShoppingCartService::new(
            UserRecipeLinkRepository::new(link_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.remove("u1", "r1").await;
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Recipe is not in the shopping cart.");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }
}
