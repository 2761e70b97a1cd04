use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use color_eyre::eyre::{eyre, WrapErr};
use costing::UnitDefinition;
use db::bakery::{recipe_ids_using_ingredient, Ingredient};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

use super::{decimal, recipe_cost_key};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateIngredientRequest {
    name: String,
    unit: String,
    cost_per_unit: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateCostRequest {
    /// Keeps the current unit when missing.
    unit: Option<String>,
    cost_per_unit: f64,
}

fn validate_cost(cost_per_unit: f64) -> ResponseResult<()> {
    if cost_per_unit < 0.0 {
        return Err(eyre!("cost_per_unit can't be negative"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    Ok(())
}

fn validate_unit(unit: &str) -> ResponseResult<String> {
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(eyre!("unit is required")).with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    if let Err(err) = UnitDefinition::parse(unit) {
        tracing::warn!(%err, "Ingredient priced in a unit the converter doesn't know");
    }

    Ok(unit.to_string())
}

pub(crate) async fn get_ingredient(state: &AppState, ingredient_id: Uuid) -> ResponseResult<Ingredient> {
    Ingredient::get_by_id(&state.db, ingredient_id)
        .await
        .wrap_err("Failed to fetch ingredient")?
        .ok_or_else(|| eyre!("Ingredient {ingredient_id} not found"))
        .with_status(StatusCode::NOT_FOUND)
}

pub(crate) async fn list(State(state): State<AppState>) -> ResponseResult<impl IntoResponse> {
    let ingredients = Ingredient::list(&state.db)
        .await
        .wrap_err("Failed to list ingredients")?;

    Ok(Json(ingredients))
}

#[axum_macros::debug_handler]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateIngredientRequest>,
) -> ResponseResult<impl IntoResponse> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(eyre!("name is required")).with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let unit = validate_unit(&request.unit)?;
    validate_cost(request.cost_per_unit)?;

    if Ingredient::get_by_name(&state.db, &name)
        .await
        .wrap_err("Failed to look up ingredient")?
        .is_some()
    {
        return Err(eyre!("An ingredient named {name} already exists"))
            .with_status(StatusCode::CONFLICT);
    }

    let ingredient = Ingredient::create(
        &state.db,
        name,
        unit,
        decimal("cost_per_unit", request.cost_per_unit)?,
    )
    .await
    .wrap_err("Failed to create ingredient")?;

    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub(crate) async fn show(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let ingredient = get_ingredient(&state, ingredient_id).await?;

    Ok(Json(ingredient))
}

/// New price for an ingredient. Every cached recipe cost that uses it is dropped.
#[axum_macros::debug_handler]
pub(crate) async fn update_cost(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
    Json(request): Json<UpdateCostRequest>,
) -> ResponseResult<impl IntoResponse> {
    let ingredient = get_ingredient(&state, ingredient_id).await?;

    let unit = match &request.unit {
        Some(unit) => validate_unit(unit)?,
        None => ingredient.unit.clone(),
    };
    validate_cost(request.cost_per_unit)?;

    let updated = ingredient
        .update_cost(
            &state.db,
            unit,
            decimal("cost_per_unit", request.cost_per_unit)?,
        )
        .await
        .wrap_err("Failed to update ingredient cost")?;

    let recipe_ids = recipe_ids_using_ingredient(&state.db, ingredient_id)
        .await
        .wrap_err("Failed to find recipes using ingredient")?;
    for recipe_id in &recipe_ids {
        state.recipe_costs.invalidate(&recipe_cost_key(*recipe_id)).await;
    }
    tracing::info!(
        %ingredient_id,
        recipes = recipe_ids.len(),
        "Dropped cached recipe costs after price change"
    );

    Ok(Json(updated))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let ingredient = get_ingredient(&state, ingredient_id).await?;

    let in_use = recipe_ids_using_ingredient(&state.db, ingredient_id)
        .await
        .wrap_err("Failed to find recipes using ingredient")?;
    if !in_use.is_empty() {
        return Err(eyre!(
            "Ingredient {ingredient_id} is used by {} recipe(s)",
            in_use.len()
        ))
        .with_status(StatusCode::CONFLICT);
    }

    ingredient
        .delete(&state.db)
        .await
        .wrap_err("Failed to delete ingredient")?;

    Ok(StatusCode::NO_CONTENT)
}
