//! Repository over the user-to-recipe join tables.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::entities::{Favorite, ShoppingCartEntry, UserRecipeLink};
use ladle_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter};

/// Repository for one [`UserRecipeLink`] table.
///
/// Instantiated once per join table; see [`FavoriteRepository`] and
/// [`ShoppingCartRepository`].
pub struct UserRecipeLinkRepository<E: UserRecipeLink> {
    db: Arc<DatabaseConnection>,
    _entity: PhantomData<E>,
}

/// Repository over the `favorite` table.
pub type FavoriteRepository = UserRecipeLinkRepository<Favorite>;

/// Repository over the `shopping_cart_entry` table.
pub type ShoppingCartRepository = UserRecipeLinkRepository<ShoppingCartEntry>;

impl<E: UserRecipeLink> Clone for UserRecipeLinkRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: UserRecipeLink> UserRecipeLinkRepository<E> {
    /// Create a new link repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Find a link row by its (user, recipe) pair.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<Option<E::Model>> {
        E::find()
            .filter(E::user_id_column().eq(user_id))
            .filter(E::recipe_id_column().eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a (user, recipe) link exists.
    pub async fn exists(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, recipe_id).await?.is_some())
    }

    /// Insert a link row.
    pub async fn create(&self, link: E::Link) -> AppResult<()>
    where
        E::Model: IntoActiveModel<E::Link>,
    {
        E::insert(link)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete the link for a (user, recipe) pair, returning how many rows
    /// were removed.
    pub async fn delete_by_pair(&self, user_id: &str, recipe_id: &str) -> AppResult<u64> {
        let result = E::delete_many()
            .filter(E::user_id_column().eq(user_id))
            .filter(E::recipe_id_column().eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// IDs of every recipe linked to a user.
    pub async fn recipe_ids_for_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        let links = E::find()
            .filter(E::user_id_column().eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(links
            .iter()
            .map(|link| E::recipe_id(link).to_string())
            .collect())
    }
}
