use chrono::{DateTime, NaiveDateTime, Utc};
use color_eyre::Result;
use costing::OrderItemEstimate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in_production")]
    InProduction,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "delivered")]
    Delivered,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::InProduction => write!(f, "in_production"),
            OrderStatus::Ready => write!(f, "ready"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "in_production" => Ok(OrderStatus::InProduction),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {s}")),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub order_id: Uuid,
    pub customer_name: String,
    pub delivery_at: NaiveDateTime,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[tracing::instrument(name = "Order::create", skip(pool, notes), err)]
    pub async fn create(
        pool: &PgPool,
        customer_name: String,
        delivery_at: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<Self> {
        let order = sqlx::query_as::<_, Order>(
            "
            INSERT INTO orders (customer_name, delivery_at, notes)
            VALUES ($1, $2, $3)
            RETURNING
                order_id,
                customer_name,
                delivery_at,
                status,
                notes,
                created_at,
                updated_at
            ",
        )
        .bind(customer_name)
        .bind(delivery_at)
        .bind(notes)
        .fetch_one(pool)
        .await?;

        Ok(order)
    }

    pub async fn get_by_id(pool: &PgPool, order_id: Uuid) -> Result<Option<Self>> {
        let order = sqlx::query_as::<_, Order>(
            "
            SELECT
                order_id,
                customer_name,
                delivery_at,
                status,
                notes,
                created_at,
                updated_at
            FROM orders
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Open orders delivering at or after `from`, soonest first.
    pub async fn list_upcoming(pool: &PgPool, from: NaiveDateTime) -> Result<Vec<Self>> {
        let orders = sqlx::query_as::<_, Order>(
            "
            SELECT
                order_id,
                customer_name,
                delivery_at,
                status,
                notes,
                created_at,
                updated_at
            FROM orders
            WHERE delivery_at >= $1
                AND status NOT IN ('delivered', 'cancelled')
            ORDER BY delivery_at
            ",
        )
        .bind(from)
        .fetch_all(pool)
        .await?;

        Ok(orders)
    }

    #[tracing::instrument(name = "Order::update_status", skip(self, pool), fields(order_id = %self.order_id), err)]
    pub async fn update_status(&self, pool: &PgPool, status: OrderStatus) -> Result<Self> {
        let updated = sqlx::query_as::<_, Order>(
            "
            UPDATE orders
            SET status = $2,
                updated_at = NOW()
            WHERE order_id = $1
            RETURNING
                order_id,
                customer_name,
                delivery_at,
                status,
                notes,
                created_at,
                updated_at
            ",
        )
        .bind(self.order_id)
        .bind(status.to_string())
        .fetch_one(pool)
        .await?;

        Ok(updated)
    }

    pub async fn items(&self, pool: &PgPool) -> Result<Vec<OrderItemDetail>> {
        OrderItemDetail::get_by_order(pool, self.order_id).await
    }

    pub async fn item_estimates(&self, pool: &PgPool) -> Result<Vec<OrderItemEstimate>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "
            SELECT
                oi.quantity::BIGINT,
                p.production_minutes::BIGINT
            FROM order_items oi
            JOIN products p ON p.product_id = oi.product_id
            WHERE oi.order_id = $1
            ",
        )
        .bind(self.order_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(quantity, minutes_per_unit)| OrderItemEstimate {
                quantity,
                minutes_per_unit,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub order_item_id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[tracing::instrument(name = "OrderItem::create", skip(pool), err)]
    pub async fn create(
        pool: &PgPool,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Self> {
        let item = sqlx::query_as::<_, OrderItem>(
            "
            INSERT INTO order_items (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING
                order_item_id,
                order_id,
                product_id,
                quantity,
                created_at
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItemDetail {
    pub order_item_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub production_minutes: i32,
}

impl OrderItemDetail {
    pub async fn get_by_order(pool: &PgPool, order_id: Uuid) -> Result<Vec<Self>> {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            "
            SELECT
                oi.order_item_id,
                oi.product_id,
                p.name AS product_name,
                oi.quantity,
                p.production_minutes
            FROM order_items oi
            JOIN products p ON p.product_id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at
            ",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }
}
