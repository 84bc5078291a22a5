//! Shopping list aggregation service.
//!
//! Collapses every recipe in a user's cart into one ingredient list,
//! summing amounts per (name, unit) pair, rendered as a plain-text
//! report for download.

use ladle_common::AppResult;
use ladle_db::repositories::{IngredientTotal, RecipeRepository, ShoppingCartRepository};

/// Fixed first line of the downloadable report.
const REPORT_HEADER: &str = "Список покупок:";

/// Shopping list service.
#[derive(Clone)]
pub struct ShoppingListService {
    cart_repo: ShoppingCartRepository,
    recipe_repo: RecipeRepository,
}

impl ShoppingListService {
    /// Create a new shopping list service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
        }
    }

    /// Build the aggregated shopping list report for a user.
    ///
    /// An empty cart produces the header alone, not an error.
    pub async fn build_report(&self, user_id: &str) -> AppResult<String> {
        let recipe_ids = self.cart_repo.recipe_ids_for_user(user_id).await?;
        let totals = self.recipe_repo.ingredient_totals(&recipe_ids).await?;

        Ok(render_report(&totals))
    }
}

/// Render ingredient totals as the downloadable report text.
fn render_report(totals: &[IngredientTotal]) -> String {
    let lines: Vec<String> = totals
        .iter()
        .map(|t| format!("• {} - {} {}", t.name, t.total, t.measurement_unit))
        .collect();

    format!("{REPORT_HEADER}\n\n{}", lines.join("\n"))
}
