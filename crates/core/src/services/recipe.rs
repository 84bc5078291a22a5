//! Recipe authoring and read-view service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ladle_common::{AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key};
use ladle_db::{
    entities::{recipe, recipe_ingredient, user},
    repositories::{
        FavoriteRepository, IngredientRepository, RecipeListFilter, RecipeRepository,
        ShoppingCartRepository, SubscriptionRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::media::decode_data_url;

/// Minimum cooking time in minutes.
const MIN_COOKING_TIME: i32 = 1;

/// Minimum amount on an ingredient line.
const MIN_INGREDIENT_AMOUNT: i32 = 1;

/// One (ingredient, amount) pair of an authoring payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmount {
    /// Ingredient ID.
    pub id: String,
    /// Amount in the ingredient's unit.
    pub amount: i32,
}

/// Input for creating a recipe.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1))]
    pub text: String,

    pub cooking_time: i32,

    /// Base64 data URL; required, checked separately for a clear message.
    pub image: Option<String>,

    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
}

/// Input for updating a recipe.
///
/// Image and ingredients stay mandatory; a nominally partial update
/// still replaces the full line set.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub text: Option<String>,

    pub cooking_time: Option<i32>,

    pub image: Option<String>,

    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
}

/// Filter parameters of a recipe listing.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    /// Only recipes by this author.
    pub author_id: Option<String>,
    /// Only recipes the viewer favorited.
    pub favorited: bool,
    /// Only recipes in the viewer's shopping cart.
    pub in_cart: bool,
}

/// An expanded ingredient line of a recipe view.
#[derive(Debug, Clone)]
pub struct IngredientLineView {
    /// Ingredient ID.
    pub ingredient_id: String,
    /// Ingredient name.
    pub name: String,
    /// Measurement unit.
    pub measurement_unit: String,
    /// Amount on this line.
    pub amount: i32,
}

/// Full read view of a recipe, relative to a viewer.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    /// The recipe row.
    pub recipe: recipe::Model,
    /// The recipe's author.
    pub author: user::Model,
    /// Whether the viewer subscribes to the author.
    pub author_is_subscribed: bool,
    /// Expanded ingredient lines in insertion order.
    pub ingredients: Vec<IngredientLineView>,
    /// Whether the viewer favorited this recipe.
    pub is_favorited: bool,
    /// Whether this recipe is in the viewer's shopping cart.
    pub is_in_shopping_cart: bool,
}

/// Recipe service for authoring and read views.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
    user_repo: UserRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: ShoppingCartRepository,
    subscription_repo: SubscriptionRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    pub const fn new(
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
        user_repo: UserRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: ShoppingCartRepository,
        subscription_repo: SubscriptionRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            recipe_repo,
            ingredient_repo,
            user_repo,
            favorite_repo,
            cart_repo,
            subscription_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a recipe with its ingredient lines.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateRecipeInput,
    ) -> AppResult<RecipeDetail> {
        input.validate()?;
        let image = require_image(input.image.as_deref())?;
        validate_cooking_time(input.cooking_time)?;
        validate_lines(&input.ingredients)?;
        self.check_ingredients_exist(&input.ingredients).await?;

        let image_url = self.store_image(author_id, image).await?;

        let recipe_id = self.id_gen.generate();
        let model = recipe::ActiveModel {
            id: Set(recipe_id.clone()),
            author_id: Set(author_id.to_string()),
            name: Set(input.name),
            image_url: Set(image_url),
            text: Set(input.text),
            cooking_time: Set(input.cooking_time),
            created_at: Set(chrono::Utc::now().into()),
        };
        let lines = self.build_lines(&recipe_id, &input.ingredients);

        let created = self.recipe_repo.create_with_lines(model, lines).await?;

        self.get_detail(Some(author_id), &created.id).await
    }

    /// Update a recipe, replacing its ingredient lines wholesale.
    ///
    /// Only the author may update; omitted attributes keep their stored
    /// values.
    pub async fn update(
        &self,
        viewer_id: &str,
        recipe_id: &str,
        input: UpdateRecipeInput,
    ) -> AppResult<RecipeDetail> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        if existing.author_id != viewer_id {
            return Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }

        input.validate()?;
        let image = require_image(input.image.as_deref())?;
        if let Some(cooking_time) = input.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        validate_lines(&input.ingredients)?;
        self.check_ingredients_exist(&input.ingredients).await?;

        let image_url = self.store_image(viewer_id, image).await?;
        let lines = self.build_lines(recipe_id, &input.ingredients);

        let mut active: recipe::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(text) = input.text {
            active.text = Set(text);
        }
        if let Some(cooking_time) = input.cooking_time {
            active.cooking_time = Set(cooking_time);
        }
        active.image_url = Set(image_url);

        let updated = self
            .recipe_repo
            .update_with_lines(active, recipe_id, lines)
            .await?;

        self.get_detail(Some(viewer_id), &updated.id).await
    }

    /// Delete a recipe; author only.
    pub async fn delete(&self, viewer_id: &str, recipe_id: &str) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        if recipe.author_id != viewer_id {
            return Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }

        self.recipe_repo.delete(recipe_id).await
    }

    /// Get a recipe row by ID.
    pub async fn get(&self, id: &str) -> AppResult<recipe::Model> {
        self.recipe_repo.get_by_id(id).await
    }

    /// Get the full read view of one recipe.
    pub async fn get_detail(&self, viewer_id: Option<&str>, id: &str) -> AppResult<RecipeDetail> {
        let recipe = self.recipe_repo.get_by_id(id).await?;
        let mut details = self.detail_many(viewer_id, vec![recipe]).await?;

        details
            .pop()
            .ok_or_else(|| AppError::Internal("Recipe view vanished".to_string()))
    }

    /// List recipes with viewer-relative filters, oldest first.
    ///
    /// The boolean filters apply only for authenticated viewers;
    /// anonymous requests see the unfiltered listing.
    pub async fn list(
        &self,
        viewer_id: Option<&str>,
        query: &RecipeListQuery,
        limit: u64,
        offset: u64,
    ) -> AppResult<(u64, Vec<RecipeDetail>)> {
        let filter = RecipeListFilter {
            author_id: query.author_id.clone(),
            favorited_by: viewer_id
                .filter(|_| query.favorited)
                .map(ToString::to_string),
            in_cart_of: viewer_id.filter(|_| query.in_cart).map(ToString::to_string),
        };

        let count = self.recipe_repo.count_filtered(&filter).await?;
        let recipes = self.recipe_repo.find_filtered(&filter, limit, offset).await?;
        let details = self.detail_many(viewer_id, recipes).await?;

        Ok((count, details))
    }

    /// Expand recipe rows into full read views.
    pub async fn detail_many(
        &self,
        viewer_id: Option<&str>,
        recipes: Vec<recipe::Model>,
    ) -> AppResult<Vec<RecipeDetail>> {
        let author_ids: Vec<String> = recipes
            .iter()
            .map(|r| r.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        // Viewer-relative flags; all false for anonymous viewers.
        let (favorited, in_cart, subscribed) = match viewer_id {
            Some(viewer) => (
                self.favorite_repo
                    .recipe_ids_for_user(viewer)
                    .await?
                    .into_iter()
                    .collect::<HashSet<_>>(),
                self.cart_repo
                    .recipe_ids_for_user(viewer)
                    .await?
                    .into_iter()
                    .collect::<HashSet<_>>(),
                self.subscription_repo
                    .author_ids_for(viewer)
                    .await?
                    .into_iter()
                    .collect::<HashSet<_>>(),
            ),
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        let mut details = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            let author = authors
                .get(&recipe.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal("Recipe author missing".to_string()))?;

            let ingredients = self.expand_lines(&recipe.id).await?;

            details.push(RecipeDetail {
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                author_is_subscribed: subscribed.contains(&author.id),
                recipe,
                author,
                ingredients,
            });
        }

        Ok(details)
    }

    async fn expand_lines(&self, recipe_id: &str) -> AppResult<Vec<IngredientLineView>> {
        let lines = self.recipe_repo.find_lines(recipe_id).await?;

        let ingredient_ids: Vec<String> = lines.iter().map(|l| l.ingredient_id.clone()).collect();
        let ingredients: HashMap<String, _> = self
            .ingredient_repo
            .find_by_ids(&ingredient_ids)
            .await?
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();

        let mut views = Vec::with_capacity(lines.len());
        for line in lines {
            let ingredient = ingredients
                .get(&line.ingredient_id)
                .ok_or_else(|| AppError::Internal("Ingredient line dangling".to_string()))?;

            views.push(IngredientLineView {
                ingredient_id: ingredient.id.clone(),
                name: ingredient.name.clone(),
                measurement_unit: ingredient.measurement_unit.clone(),
                amount: line.amount,
            });
        }

        Ok(views)
    }

    async fn check_ingredients_exist(&self, ingredients: &[IngredientAmount]) -> AppResult<()> {
        let ids: Vec<String> = ingredients.iter().map(|l| l.id.clone()).collect();
        let found: HashSet<String> = self
            .ingredient_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();

        for line in ingredients {
            if !found.contains(&line.id) {
                return Err(AppError::Validation(format!(
                    "Ingredient with id {} does not exist.",
                    line.id
                )));
            }
        }

        Ok(())
    }

    async fn store_image(&self, author_id: &str, data_url: &str) -> AppResult<String> {
        let image = decode_data_url(data_url)?;
        let key = generate_storage_key(author_id, &image.extension);
        let stored = self
            .storage
            .upload(&key, &image.bytes, &image.content_type)
            .await?;

        Ok(stored.url)
    }

    fn build_lines(
        &self,
        recipe_id: &str,
        ingredients: &[IngredientAmount],
    ) -> Vec<recipe_ingredient::ActiveModel> {
        ingredients
            .iter()
            .map(|line| recipe_ingredient::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                ingredient_id: Set(line.id.clone()),
                amount: Set(line.amount),
            })
            .collect()
    }
}

/// Reject payloads without an image value.
fn require_image(image: Option<&str>) -> AppResult<&str> {
    image
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Image is required.".to_string()))
}

fn validate_cooking_time(cooking_time: i32) -> AppResult<()> {
    if cooking_time < MIN_COOKING_TIME {
        return Err(AppError::Validation(format!(
            "Cooking time must be at least {MIN_COOKING_TIME}."
        )));
    }

    Ok(())
}

/// Check the structural line rules: non-empty, distinct ids, minimum amounts.
fn validate_lines(ingredients: &[IngredientAmount]) -> AppResult<()> {
    if ingredients.is_empty() {
        return Err(AppError::Validation(
            "Ingredient list must not be empty.".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for line in ingredients {
        if !seen.insert(line.id.as_str()) {
            return Err(AppError::Validation(
                "Ingredient ids must be distinct.".to_string(),
            ));
        }
        if line.amount < MIN_INGREDIENT_AMOUNT {
            return Err(AppError::Validation(format!(
                "Ingredient amount must be at least {MIN_INGREDIENT_AMOUNT}."
            )));
        }
    }

    Ok(())
}
