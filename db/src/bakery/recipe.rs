use std::num::NonZeroU32;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use costing::{IngredientLine, RecipeCostInput};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::decimal_to_f64;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub servings: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    #[tracing::instrument(name = "Recipe::create", skip(pool, description), err)]
    pub async fn create(
        pool: &PgPool,
        name: String,
        description: Option<String>,
        servings: i32,
    ) -> Result<Self> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            INSERT INTO recipes (name, description, servings)
            VALUES ($1, $2, $3)
            RETURNING
                recipe_id,
                name,
                description,
                servings,
                created_at,
                updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(servings)
        .fetch_one(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn get_by_id(pool: &PgPool, recipe_id: Uuid) -> Result<Option<Self>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            SELECT
                recipe_id,
                name,
                description,
                servings,
                created_at,
                updated_at
            FROM recipes
            WHERE recipe_id = $1
            ",
        )
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            "
            SELECT
                recipe_id,
                name,
                description,
                servings,
                created_at,
                updated_at
            FROM recipes
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(recipes)
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        name: String,
        description: Option<String>,
        servings: i32,
    ) -> Result<Self> {
        let updated = sqlx::query_as::<_, Recipe>(
            "
            UPDATE recipes
            SET name = $2,
                description = $3,
                servings = $4,
                updated_at = NOW()
            WHERE recipe_id = $1
            RETURNING
                recipe_id,
                name,
                description,
                servings,
                created_at,
                updated_at
            ",
        )
        .bind(self.recipe_id)
        .bind(name)
        .bind(description)
        .bind(servings)
        .fetch_one(pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(self.recipe_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn get_full(pool: &PgPool, recipe_id: Uuid) -> Result<Option<RecipeWithDetails>> {
        let Some(recipe) = Self::get_by_id(pool, recipe_id).await? else {
            return Ok(None);
        };

        let ingredients = RecipeIngredientDetail::get_by_recipe(pool, recipe_id).await?;

        Ok(Some(RecipeWithDetails {
            recipe,
            ingredients,
        }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeWithDetails {
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredientDetail>,
}

impl RecipeWithDetails {
    /// Turns the stored recipe into the typed input of the cost calculator.
    pub fn cost_input(&self) -> Result<RecipeCostInput> {
        let servings = u32::try_from(self.recipe.servings)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                eyre!(
                    "Recipe {} has an invalid serving count of {}",
                    self.recipe.recipe_id,
                    self.recipe.servings
                )
            })?;

        let lines = self
            .ingredients
            .iter()
            .map(RecipeIngredientDetail::to_line)
            .collect::<Result<_>>()?;

        Ok(RecipeCostInput { servings, lines })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    pub recipe_ingredient_id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: BigDecimal,
    pub unit: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeIngredient {
    #[tracing::instrument(name = "RecipeIngredient::create", skip(pool, notes), err)]
    pub async fn create(
        pool: &PgPool,
        recipe_id: Uuid,
        ingredient_id: Uuid,
        quantity: BigDecimal,
        unit: String,
        notes: Option<String>,
    ) -> Result<Self> {
        let recipe_ingredient = sqlx::query_as::<_, RecipeIngredient>(
            "
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                recipe_ingredient_id,
                recipe_id,
                ingredient_id,
                quantity,
                unit,
                notes,
                created_at,
                updated_at
            ",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(quantity)
        .bind(unit)
        .bind(notes)
        .fetch_one(pool)
        .await?;

        Ok(recipe_ingredient)
    }

    pub async fn get_by_id(pool: &PgPool, recipe_ingredient_id: Uuid) -> Result<Option<Self>> {
        let recipe_ingredient = sqlx::query_as::<_, RecipeIngredient>(
            "
            SELECT
                recipe_ingredient_id,
                recipe_id,
                ingredient_id,
                quantity,
                unit,
                notes,
                created_at,
                updated_at
            FROM recipe_ingredients
            WHERE recipe_ingredient_id = $1
            ",
        )
        .bind(recipe_ingredient_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe_ingredient)
    }

    pub async fn delete(&self, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_ingredient_id = $1")
            .bind(self.recipe_ingredient_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// A recipe line joined with the ingredient it points at.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredientDetail {
    pub recipe_ingredient_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub native_unit: String,
    pub cost_per_unit: BigDecimal,
    pub notes: Option<String>,
}

impl RecipeIngredientDetail {
    pub async fn get_by_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>> {
        let lines = sqlx::query_as::<_, RecipeIngredientDetail>(
            "
            SELECT
                ri.recipe_ingredient_id,
                ri.ingredient_id,
                i.name AS ingredient_name,
                ri.quantity,
                ri.unit,
                i.unit AS native_unit,
                i.cost_per_unit,
                ri.notes
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.created_at
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }

    pub fn to_line(&self) -> Result<IngredientLine> {
        Ok(IngredientLine {
            ingredient_id: Some(self.ingredient_id),
            name: self.ingredient_name.clone(),
            quantity: decimal_to_f64("quantity", &self.quantity)?,
            unit: self.unit.clone(),
            native_unit: self.native_unit.clone(),
            cost_per_unit: decimal_to_f64("cost_per_unit", &self.cost_per_unit)?,
        })
    }
}

/// Recipes that use an ingredient, so cached costs can be dropped when its
/// price changes.
pub async fn recipe_ids_using_ingredient(pool: &PgPool, ingredient_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT DISTINCT recipe_id FROM recipe_ingredients WHERE ingredient_id = $1",
    )
    .bind(ingredient_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::bakery::Ingredient;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_detail_to_line() {
        let detail = RecipeIngredientDetail {
            recipe_ingredient_id: Uuid::new_v4(),
            ingredient_id: Uuid::new_v4(),
            ingredient_name: "Cream".to_string(),
            quantity: dec("500"),
            unit: "ml".to_string(),
            native_unit: "l".to_string(),
            cost_per_unit: dec("4.80"),
            notes: None,
        };

        let line = detail.to_line().unwrap();

        assert_eq!(line.ingredient_id, Some(detail.ingredient_id));
        assert_eq!(line.name, "Cream");
        assert!((line.quantity - 500.0).abs() < 1e-9);
        assert!((line.cost_per_unit - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_unrepresentable_cost_is_an_error() {
        let detail = RecipeIngredientDetail {
            recipe_ingredient_id: Uuid::new_v4(),
            ingredient_id: Uuid::new_v4(),
            ingredient_name: "Saffron".to_string(),
            quantity: dec("1"),
            unit: "g".to_string(),
            native_unit: "g".to_string(),
            cost_per_unit: dec("1e400"),
            notes: None,
        };

        assert!(detail.to_line().is_err());

        let details = RecipeWithDetails {
            recipe: Recipe {
                recipe_id: Uuid::new_v4(),
                name: "Gilded".to_string(),
                description: None,
                servings: 4,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            ingredients: vec![detail],
        };

        assert!(details.cost_input().is_err());
    }

    #[test]
    fn test_cost_input_rejects_non_positive_servings() {
        let details = RecipeWithDetails {
            recipe: Recipe {
                recipe_id: Uuid::new_v4(),
                name: "Broken".to_string(),
                description: None,
                servings: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            ingredients: vec![],
        };

        assert!(details.cost_input().is_err());
    }

    #[sqlx::test]
    async fn test_recipe_full_and_cost_input(pool: PgPool) {
        let flour = Ingredient::create(&pool, "Flour".to_string(), "kg".to_string(), dec("30"))
            .await
            .unwrap();
        let cream = Ingredient::create(&pool, "Cream".to_string(), "l".to_string(), dec("48"))
            .await
            .unwrap();

        let recipe = Recipe::create(&pool, "Sponge".to_string(), None, 8)
            .await
            .unwrap();
        RecipeIngredient::create(
            &pool,
            recipe.recipe_id,
            flour.ingredient_id,
            dec("2000"),
            "g".to_string(),
            None,
        )
        .await
        .unwrap();
        RecipeIngredient::create(
            &pool,
            recipe.recipe_id,
            cream.ingredient_id,
            dec("500"),
            "ml".to_string(),
            Some("whipped".to_string()),
        )
        .await
        .unwrap();

        let full = Recipe::get_full(&pool, recipe.recipe_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(full.ingredients.len(), 2);

        let cost = costing::calculate_recipe_cost(&full.cost_input().unwrap());
        assert!((cost.total_cost - 84.0).abs() < 1e-9);
        assert!((cost.cost_per_serving - 10.5).abs() < 1e-9);

        let users = recipe_ids_using_ingredient(&pool, cream.ingredient_id)
            .await
            .unwrap();
        assert_eq!(users, vec![recipe.recipe_id]);
    }

    #[sqlx::test]
    async fn test_recipe_rejects_zero_servings(pool: PgPool) {
        let result = Recipe::create(&pool, "Nothing".to_string(), None, 0).await;

        assert!(result.is_err());
    }

    #[sqlx::test]
    async fn test_recipe_delete_cascades_lines(pool: PgPool) {
        let sugar = Ingredient::create(&pool, "Sugar".to_string(), "kg".to_string(), dec("2"))
            .await
            .unwrap();
        let recipe = Recipe::create(&pool, "Syrup".to_string(), None, 1)
            .await
            .unwrap();
        let line = RecipeIngredient::create(
            &pool,
            recipe.recipe_id,
            sugar.ingredient_id,
            dec("1"),
            "cup".to_string(),
            None,
        )
        .await
        .unwrap();

        recipe.delete(&pool).await.unwrap();

        assert!(RecipeIngredient::get_by_id(&pool, line.recipe_ingredient_id)
            .await
            .unwrap()
            .is_none());
    }
}
