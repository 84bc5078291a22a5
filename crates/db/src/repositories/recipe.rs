//! Recipe repository.

use std::sync::Arc;

use crate::entities::{
    Favorite, Recipe, RecipeIngredient, ShoppingCartEntry, favorite, ingredient, recipe,
    recipe_ingredient, shopping_cart_entry,
};
use ladle_common::{AppError, AppResult};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

/// Filter applied to recipe listings.
#[derive(Debug, Clone, Default)]
pub struct RecipeListFilter {
    /// Only recipes published by this author.
    pub author_id: Option<String>,
    /// Only recipes favorited by this user.
    pub favorited_by: Option<String>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<String>,
}

/// One aggregated ingredient of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientTotal {
    /// Ingredient name.
    pub name: String,
    /// Unit shared by every summed line.
    pub measurement_unit: String,
    /// Sum of line amounts across the selected recipes.
    pub total: i64,
}

#[derive(FromQueryResult)]
struct IngredientTotalRow {
    name: String,
    measurement_unit: String,
    total: Option<i64>,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a recipe by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Create a recipe together with its ingredient lines.
    ///
    /// The recipe and its lines land in one transaction; a failed line
    /// insert leaves no partial recipe behind.
    pub async fn create_with_lines(
        &self,
        recipe: recipe::ActiveModel,
        lines: Vec<recipe_ingredient::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = recipe
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !lines.is_empty() {
            RecipeIngredient::insert_many(lines)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Update a recipe, replacing its ingredient lines wholesale.
    ///
    /// Existing lines are dropped before the new set is written, all in
    /// one transaction with the attribute update.
    pub async fn update_with_lines(
        &self,
        recipe: recipe::ActiveModel,
        recipe_id: &str,
        lines: Vec<recipe_ingredient::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !lines.is_empty() {
            RecipeIngredient::insert_many(lines)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        let model = recipe
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Delete a recipe; lines, favorites and cart entries cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    fn filtered(filter: &RecipeListFilter) -> sea_orm::Select<Recipe> {
        let mut query = Recipe::find();

        if let Some(author_id) = &filter.author_id {
            query = query.filter(recipe::Column::AuthorId.eq(author_id));
        }

        if let Some(user_id) = &filter.favorited_by {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(favorite::Column::RecipeId)
                        .from(Favorite)
                        .and_where(favorite::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }

        if let Some(user_id) = &filter.in_cart_of {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(shopping_cart_entry::Column::RecipeId)
                        .from(ShoppingCartEntry)
                        .and_where(shopping_cart_entry::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }

        query
    }

    /// List recipes matching a filter, oldest first (with limit/offset).
    pub async fn find_filtered(
        &self,
        filter: &RecipeListFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<recipe::Model>> {
        Self::filtered(filter)
            .order_by_asc(recipe::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes matching a filter.
    pub async fn count_filtered(&self, filter: &RecipeListFilter) -> AppResult<u64> {
        Self::filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List recipes of one author, oldest first, optionally capped.
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        let mut query = Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_asc(recipe::Column::CreatedAt);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes of one author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient lines of a recipe in insertion order.
    pub async fn find_lines(&self, recipe_id: &str) -> AppResult<Vec<recipe_ingredient::Model>> {
        RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredient::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Aggregate ingredient amounts across a set of recipes.
    ///
    /// Lines are grouped by (name, unit) and summed, so an ingredient used
    /// by several recipes appears once. Results come back ordered by
    /// ingredient name.
    pub async fn ingredient_totals(&self, recipe_ids: &[String]) -> AppResult<Vec<IngredientTotal>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Ingredient.def())
            .select_only()
            .column(ingredient::Column::Name)
            .column(ingredient::Column::MeasurementUnit)
            .column_as(recipe_ingredient::Column::Amount.sum(), "total")
            .group_by(ingredient::Column::Name)
            .group_by(ingredient::Column::MeasurementUnit)
            .order_by_asc(ingredient::Column::Name)
            .into_model::<IngredientTotalRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| IngredientTotal {
                name: row.name,
                measurement_unit: row.measurement_unit,
                total: row.total.unwrap_or(0),
            })
            .collect())
    }
}
