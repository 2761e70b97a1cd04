use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{AppConfig, AppState};

/// Router backed by a pool that never connects, for endpoints that don't
/// touch the database.
pub fn create_test_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/bakery_test")
        .unwrap();

    create_test_app_with_pool(pool)
}

pub fn create_test_app_with_pool(pool: PgPool) -> Router {
    let state = AppState::new(AppConfig::default(), pool);

    crate::http_server::routes::make_router().with_state(state)
}

pub fn json_request<T: Serialize>(method: &str, uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn response_body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
