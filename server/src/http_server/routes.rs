use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::AppState;

use super::api::{calculations, ingredients, orders, products, recipes};

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/_", get(versions))
        // Stateless calculators
        .route("/api/units", get(calculations::list_units))
        .route("/api/calculations/convert", post(calculations::convert))
        .route(
            "/api/calculations/recipe-cost",
            post(calculations::recipe_cost),
        )
        .route(
            "/api/calculations/production-schedule",
            post(calculations::production_schedule),
        )
        // Ingredients
        .route(
            "/api/ingredients",
            get(ingredients::list).post(ingredients::create),
        )
        .route(
            "/api/ingredients/{ingredient_id}",
            get(ingredients::show).delete(ingredients::delete),
        )
        .route(
            "/api/ingredients/{ingredient_id}/cost",
            put(ingredients::update_cost),
        )
        // Recipes
        .route("/api/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/api/recipes/{recipe_id}",
            get(recipes::show)
                .put(recipes::update)
                .delete(recipes::delete),
        )
        .route(
            "/api/recipes/{recipe_id}/ingredients",
            post(recipes::add_ingredient),
        )
        .route(
            "/api/recipes/{recipe_id}/ingredients/{recipe_ingredient_id}",
            delete(recipes::remove_ingredient),
        )
        .route("/api/recipes/{recipe_id}/cost", get(recipes::cost))
        .route("/api/cache/recipe-costs", delete(recipes::clear_cost_cache))
        // Products and orders
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/{order_id}", get(orders::show))
        .route("/api/orders/{order_id}/status", put(orders::update_status))
        .route("/api/orders/{order_id}/items", post(orders::add_item))
        .route("/api/orders/{order_id}/schedule", get(orders::schedule))
        .fallback(fallback)
}

async fn versions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.versions)
}

async fn fallback(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("No route for {uri}") })),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::http_server::test_helpers::{create_test_app, get_request, response_body_json};

    #[tokio::test]
    async fn test_versions() {
        let app = create_test_app();

        let response = app.oneshot(get_request("/_")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response_body_json(response).await;
        assert_eq!(body["name"], "bakery-server");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = create_test_app();

        let response = app.oneshot(get_request("/api/nope")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response_body_json(response).await;
        assert_eq!(body["error"], "No route for /api/nope");
    }
}
