use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::decimal_to_f64;

/// Something the bakery buys, priced per one of its own `unit`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub cost_per_unit: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    #[tracing::instrument(name = "Ingredient::create", skip(pool), err)]
    pub async fn create(
        pool: &PgPool,
        name: String,
        unit: String,
        cost_per_unit: BigDecimal,
    ) -> Result<Self> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            INSERT INTO ingredients (name, unit, cost_per_unit)
            VALUES ($1, $2, $3)
            RETURNING
                ingredient_id,
                name,
                unit,
                cost_per_unit,
                created_at,
                updated_at
            ",
        )
        .bind(name)
        .bind(unit)
        .bind(cost_per_unit)
        .fetch_one(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_id(pool: &PgPool, ingredient_id: Uuid) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                name,
                unit,
                cost_per_unit,
                created_at,
                updated_at
            FROM ingredients
            WHERE ingredient_id = $1
            ",
        )
        .bind(ingredient_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                name,
                unit,
                cost_per_unit,
                created_at,
                updated_at
            FROM ingredients
            WHERE LOWER(name) = LOWER($1)
            ",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                name,
                unit,
                cost_per_unit,
                created_at,
                updated_at
            FROM ingredients
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    #[tracing::instrument(name = "Ingredient::update_cost", skip(self, pool), fields(ingredient_id = %self.ingredient_id), err)]
    pub async fn update_cost(
        &self,
        pool: &PgPool,
        unit: String,
        cost_per_unit: BigDecimal,
    ) -> Result<Self> {
        let updated = sqlx::query_as::<_, Ingredient>(
            "
            UPDATE ingredients
            SET unit = $2,
                cost_per_unit = $3,
                updated_at = NOW()
            WHERE ingredient_id = $1
            RETURNING
                ingredient_id,
                name,
                unit,
                cost_per_unit,
                created_at,
                updated_at
            ",
        )
        .bind(self.ingredient_id)
        .bind(unit)
        .bind(cost_per_unit)
        .fetch_one(pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM ingredients WHERE ingredient_id = $1")
            .bind(self.ingredient_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub fn cost_per_unit_f64(&self) -> Result<f64> {
        decimal_to_f64("cost_per_unit", &self.cost_per_unit)
    }
}
