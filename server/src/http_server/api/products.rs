use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use color_eyre::eyre::{eyre, WrapErr};
use db::bakery::{Product, Recipe};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateProductRequest {
    name: String,
    recipe_id: Option<Uuid>,
    /// Minutes to make a single unit.
    production_minutes: i32,
}

pub(crate) async fn list(State(state): State<AppState>) -> ResponseResult<impl IntoResponse> {
    let products = Product::list(&state.db)
        .await
        .wrap_err("Failed to list products")?;

    Ok(Json(products))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ResponseResult<impl IntoResponse> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(eyre!("name is required")).with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if request.production_minutes < 0 {
        return Err(eyre!("production_minutes can't be negative"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    if let Some(recipe_id) = request.recipe_id {
        Recipe::get_by_id(&state.db, recipe_id)
            .await
            .wrap_err("Failed to fetch recipe")?
            .ok_or_else(|| eyre!("Recipe {recipe_id} not found"))
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)?;
    }

    let product = Product::create(
        &state.db,
        name,
        request.recipe_id,
        request.production_minutes,
    )
    .await
    .wrap_err("Failed to create product")?;

    Ok((StatusCode::CREATED, Json(product)))
}
