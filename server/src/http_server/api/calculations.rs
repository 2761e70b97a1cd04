use std::num::NonZeroU32;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use color_eyre::eyre::WrapErr;
use costing::{
    calculate_recipe_cost, parse_local_datetime, units::all_units, IngredientLine, OrderItemEstimate, PricedRecipe, ProductionSchedule, RecipeCostInput,
};
use serde::{Deserialize, Serialize};

use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppConfig,
};

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ConvertRequest {
    value: f64,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ConvertResponse {
    value: f64,
    converted: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecipeCostRequest {
    servings: NonZeroU32,
    #[serde(default)]
    lines: Vec<IngredientLine>,
    markup_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleRequest {
    delivery_at: String,
    #[serde(default)]
    items: Vec<OrderItemEstimate>,
    /// Production time that is already known, added to the items' total.
    #[serde(default)]
    total_minutes: i64,
}

pub(crate) async fn list_units() -> impl IntoResponse {
    Json(all_units().collect::<Vec<_>>())
}

/// Unknown or incompatible units come back unchanged with `converted: false`.
pub(crate) async fn convert(Json(request): Json<ConvertRequest>) -> Json<ConvertResponse> {
    let response = match costing::try_convert(request.value, &request.from, &request.to) {
        Some(value) => ConvertResponse {
            value,
            converted: true,
        },
        None => ConvertResponse {
            value: request.value,
            converted: false,
        },
    };

    Json(response)
}

#[axum_macros::debug_handler(state = crate::AppState)]
pub(crate) async fn recipe_cost(
    State(config): State<AppConfig>,
    Json(request): Json<RecipeCostRequest>,
) -> Json<PricedRecipe> {
    let markup_percent = request
        .markup_percent
        .unwrap_or(config.default_markup_percent);

    let input = RecipeCostInput {
        servings: request.servings,
        lines: request.lines,
    };
    let cost = calculate_recipe_cost(&input);

    Json(PricedRecipe::new(cost, markup_percent).rounded())
}

pub(crate) async fn production_schedule(
    Json(request): Json<ScheduleRequest>,
) -> ResponseResult<Json<ProductionSchedule>> {
    let delivery_at = parse_local_datetime(&request.delivery_at)
        .wrap_err_with(|| format!("Invalid delivery_at: {}", request.delivery_at))
        .with_status(StatusCode::UNPROCESSABLE_ENTITY)?;

    let schedule =
        ProductionSchedule::for_items(delivery_at, request.total_minutes, &request.items)
            .wrap_err("Failed to plan production")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)?;

    Ok(Json(schedule))
}
