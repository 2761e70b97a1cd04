use std::num::NonZeroU32;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use color_eyre::eyre::{eyre, WrapErr};
use costing::{calculate_recipe_cost, PricedRecipe, RecipeCost};
use db::bakery::{Recipe, RecipeIngredient};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

use super::{decimal, ingredients::get_ingredient, recipe_cost_key, RECIPE_COST_PREFIX};

#[derive(Debug, Deserialize)]
pub(crate) struct RecipeRequest {
    name: String,
    description: Option<String>,
    servings: NonZeroU32,
}

impl RecipeRequest {
    fn validated(self) -> ResponseResult<(String, Option<String>, i32)> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(eyre!("name is required")).with_status(StatusCode::UNPROCESSABLE_ENTITY);
        }

        let servings = i32::try_from(self.servings.get())
            .wrap_err("servings is too large")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)?;

        Ok((name, self.description, servings))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddIngredientRequest {
    ingredient_id: Uuid,
    quantity: f64,
    /// Defaults to the unit the ingredient is priced in.
    unit: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CostQuery {
    markup_percent: Option<f64>,
}

async fn get_recipe(state: &AppState, recipe_id: Uuid) -> ResponseResult<Recipe> {
    Recipe::get_by_id(&state.db, recipe_id)
        .await
        .wrap_err("Failed to fetch recipe")?
        .ok_or_else(|| eyre!("Recipe {recipe_id} not found"))
        .with_status(StatusCode::NOT_FOUND)
}

pub(crate) async fn list(State(state): State<AppState>) -> ResponseResult<impl IntoResponse> {
    let recipes = Recipe::list(&state.db)
        .await
        .wrap_err("Failed to list recipes")?;

    Ok(Json(recipes))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<RecipeRequest>,
) -> ResponseResult<impl IntoResponse> {
    let (name, description, servings) = request.validated()?;

    let recipe = Recipe::create(&state.db, name, description, servings)
        .await
        .wrap_err("Failed to create recipe")?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

pub(crate) async fn show(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::get_full(&state.db, recipe_id)
        .await
        .wrap_err("Failed to fetch recipe")?
        .ok_or_else(|| eyre!("Recipe {recipe_id} not found"))
        .with_status(StatusCode::NOT_FOUND)?;

    Ok(Json(recipe))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(request): Json<RecipeRequest>,
) -> ResponseResult<impl IntoResponse> {
    let (name, description, servings) = request.validated()?;
    let recipe = get_recipe(&state, recipe_id).await?;

    let updated = recipe
        .update(&state.db, name, description, servings)
        .await
        .wrap_err("Failed to update recipe")?;

    state.recipe_costs.invalidate(&recipe_cost_key(recipe_id)).await;

    Ok(Json(updated))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = get_recipe(&state, recipe_id).await?;

    recipe
        .delete(&state.db)
        .await
        .wrap_err("Failed to delete recipe")?;

    state.recipe_costs.invalidate(&recipe_cost_key(recipe_id)).await;

    Ok(StatusCode::NO_CONTENT)
}

#[axum_macros::debug_handler]
pub(crate) async fn add_ingredient(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(request): Json<AddIngredientRequest>,
) -> ResponseResult<impl IntoResponse> {
    if request.quantity <= 0.0 {
        return Err(eyre!("quantity must be positive"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let recipe = get_recipe(&state, recipe_id).await?;
    let ingredient = get_ingredient(&state, request.ingredient_id).await?;

    let unit = request
        .unit
        .map(|unit| unit.trim().to_string())
        .filter(|unit| !unit.is_empty())
        .unwrap_or_else(|| ingredient.unit.clone());

    if !costing::are_compatible(&unit, &ingredient.unit) && unit != ingredient.unit {
        tracing::warn!(
            recipe = %recipe.name,
            ingredient = %ingredient.name,
            unit,
            native_unit = %ingredient.unit,
            "Recipe line unit doesn't convert to the ingredient's unit, cost will use the raw quantity"
        );
    }

    let line = RecipeIngredient::create(
        &state.db,
        recipe.recipe_id,
        ingredient.ingredient_id,
        decimal("quantity", request.quantity)?,
        unit,
        request.notes,
    )
    .await
    .wrap_err("Failed to add ingredient to recipe")?;

    state.recipe_costs.invalidate(&recipe_cost_key(recipe_id)).await;

    Ok((StatusCode::CREATED, Json(line)))
}

pub(crate) async fn remove_ingredient(
    State(state): State<AppState>,
    Path((recipe_id, recipe_ingredient_id)): Path<(Uuid, Uuid)>,
) -> ResponseResult<impl IntoResponse> {
    let line = RecipeIngredient::get_by_id(&state.db, recipe_ingredient_id)
        .await
        .wrap_err("Failed to fetch recipe line")?
        .filter(|line| line.recipe_id == recipe_id)
        .ok_or_else(|| eyre!("Recipe {recipe_id} has no line {recipe_ingredient_id}"))
        .with_status(StatusCode::NOT_FOUND)?;

    line.delete(&state.db)
        .await
        .wrap_err("Failed to remove ingredient from recipe")?;

    state.recipe_costs.invalidate(&recipe_cost_key(recipe_id)).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Cost report for a stored recipe. The unpriced cost is cached per recipe,
/// markup is applied on every request.
#[tracing::instrument(skip(state, query), fields(cache_hit))]
pub(crate) async fn cost(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Query(query): Query<CostQuery>,
) -> ResponseResult<Json<PricedRecipe>> {
    let key = recipe_cost_key(recipe_id);

    let cost = if let Some(cost) = state.recipe_costs.get(&key).await {
        tracing::Span::current().record("cache_hit", true);
        cost
    } else {
        tracing::Span::current().record("cache_hit", false);
        let generation = state.recipe_costs.generation().await;
        let cost = compute_cost(&state, recipe_id).await?;
        if !state
            .recipe_costs
            .insert_if_current(key, generation, cost.clone())
            .await
        {
            tracing::debug!("Recipe costs were invalidated while computing, not caching");
        }
        cost
    };

    let markup_percent = query
        .markup_percent
        .unwrap_or(state.app.default_markup_percent);

    Ok(Json(PricedRecipe::new(cost, markup_percent).rounded()))
}

async fn compute_cost(state: &AppState, recipe_id: Uuid) -> ResponseResult<RecipeCost> {
    let recipe = Recipe::get_full(&state.db, recipe_id)
        .await
        .wrap_err("Failed to fetch recipe")?
        .ok_or_else(|| eyre!("Recipe {recipe_id} not found"))
        .with_status(StatusCode::NOT_FOUND)?;

    let input = recipe.cost_input()?;

    Ok(calculate_recipe_cost(&input))
}

/// Drops every cached recipe cost.
pub(crate) async fn clear_cost_cache(State(state): State<AppState>) -> impl IntoResponse {
    let removed = state.recipe_costs.invalidate_prefix(RECIPE_COST_PREFIX).await;
    tracing::info!(removed, "Cleared recipe cost cache");

    Json(serde_json::json!({ "removed": removed }))
}
