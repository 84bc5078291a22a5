//! Ingredient catalog service.

use ladle_common::AppResult;
use ladle_db::{entities::ingredient, repositories::IngredientRepository};

/// Ingredient service for catalog lookups.
#[derive(Clone)]
pub struct IngredientService {
    repo: IngredientRepository,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub const fn new(repo: IngredientRepository) -> Self {
        Self { repo }
    }

    /// List ingredients, optionally restricted to a name prefix.
    ///
    /// The prefix match is case-sensitive and anchored at the start of
    /// the name, matching the search box behavior.
    pub async fn list(&self, name_prefix: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        self.repo.find_all(name_prefix).await
    }

    /// Get a single ingredient by ID.
    pub async fn get(&self, id: &str) -> AppResult<ingredient::Model> {
        self.repo.get_by_id(id).await
    }
}
