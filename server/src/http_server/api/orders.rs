use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDateTime;
use color_eyre::eyre::{eyre, WrapErr};
use costing::{parse_local_datetime, ProductionSchedule};
use db::bakery::{Order, OrderItem, OrderItemDetail, OrderStatus, Product};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateOrderRequest {
    customer_name: String,
    /// Local wall-clock time, e.g. `2024-12-25T15:00`.
    delivery_at: String,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStatusRequest {
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddItemRequest {
    product_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpcomingQuery {
    from: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrderWithItems {
    #[serde(flatten)]
    order: Order,
    items: Vec<OrderItemDetail>,
    schedule: ProductionSchedule,
}

fn parse_delivery(value: &str) -> ResponseResult<NaiveDateTime> {
    parse_local_datetime(value)
        .wrap_err_with(|| format!("Invalid delivery_at: {value}"))
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
}

async fn get_order(state: &AppState, order_id: Uuid) -> ResponseResult<Order> {
    Order::get_by_id(&state.db, order_id)
        .await
        .wrap_err("Failed to fetch order")?
        .ok_or_else(|| eyre!("Order {order_id} not found"))
        .with_status(StatusCode::NOT_FOUND)
}

/// When to start baking so the order is ready by its delivery time.
async fn plan_order(state: &AppState, order: &Order) -> ResponseResult<ProductionSchedule> {
    let estimates = order
        .item_estimates(&state.db)
        .await
        .wrap_err("Failed to fetch order items")?;

    costing::plan(order.delivery_at, &estimates)
        .wrap_err("Failed to plan production")
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)
}

/// Open orders from `from` (default now) onward, soonest delivery first.
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> ResponseResult<impl IntoResponse> {
    let from = match query.from.as_deref() {
        Some(from) => parse_local_datetime(from)
            .wrap_err_with(|| format!("Invalid from: {from}"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)?,
        None => chrono::Local::now().naive_local(),
    };

    let orders = Order::list_upcoming(&state.db, from)
        .await
        .wrap_err("Failed to list orders")?;

    Ok(Json(orders))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> ResponseResult<impl IntoResponse> {
    let customer_name = request.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(eyre!("customer_name is required"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let delivery_at = parse_delivery(&request.delivery_at)?;

    let order = Order::create(&state.db, customer_name, delivery_at, request.notes)
        .await
        .wrap_err("Failed to create order")?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[axum_macros::debug_handler]
pub(crate) async fn show(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let order = get_order(&state, order_id).await?;

    let items = order
        .items(&state.db)
        .await
        .wrap_err("Failed to fetch order items")?;
    let schedule = plan_order(&state, &order).await?;

    Ok(Json(OrderWithItems {
        order,
        items,
        schedule,
    }))
}

pub(crate) async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> ResponseResult<impl IntoResponse> {
    let order = get_order(&state, order_id).await?;

    let updated = order
        .update_status(&state.db, request.status)
        .await
        .wrap_err("Failed to update order status")?;

    Ok(Json(updated))
}

pub(crate) async fn add_item(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<AddItemRequest>,
) -> ResponseResult<impl IntoResponse> {
    if request.quantity <= 0 {
        return Err(eyre!("quantity must be positive"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let order = get_order(&state, order_id).await?;
    Product::get_by_id(&state.db, request.product_id)
        .await
        .wrap_err("Failed to fetch product")?
        .ok_or_else(|| eyre!("Product {} not found", request.product_id))
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)?;

    let item = OrderItem::create(
        &state.db,
        order.order_id,
        request.product_id,
        request.quantity,
    )
    .await
    .wrap_err("Failed to add item to order")?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub(crate) async fn schedule(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ResponseResult<Json<ProductionSchedule>> {
    let order = get_order(&state, order_id).await?;

    let schedule = plan_order(&state, &order).await?;

    Ok(Json(schedule))
}
