use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Something the bakery sells. `production_minutes` is the time to make one.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub recipe_id: Option<Uuid>,
    pub production_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[tracing::instrument(name = "Product::create", skip(pool), err)]
    pub async fn create(
        pool: &PgPool,
        name: String,
        recipe_id: Option<Uuid>,
        production_minutes: i32,
    ) -> Result<Self> {
        let product = sqlx::query_as::<_, Product>(
            "
            INSERT INTO products (name, recipe_id, production_minutes)
            VALUES ($1, $2, $3)
            RETURNING
                product_id,
                name,
                recipe_id,
                production_minutes,
                created_at,
                updated_at
            ",
        )
        .bind(name)
        .bind(recipe_id)
        .bind(production_minutes)
        .fetch_one(pool)
        .await?;

        Ok(product)
    }

    pub async fn get_by_id(pool: &PgPool, product_id: Uuid) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Product>(
            "
            SELECT
                product_id,
                name,
                recipe_id,
                production_minutes,
                created_at,
                updated_at
            FROM products
            WHERE product_id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(pool)
        .await?;

        Ok(product)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let products = sqlx::query_as::<_, Product>(
            "
            SELECT
                product_id,
                name,
                recipe_id,
                production_minutes,
                created_at,
                updated_at
            FROM products
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(products)
    }
}
