use axum::body::Body;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;

use clinic_api::{app, state::AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router wired to a lazily-connected pool. Requests that are rejected
/// before any database work (auth gate, sync validation checks, the id
/// validator) are fully exercisable without a live Postgres.
pub fn test_app() -> Router {
    std::env::set_var("JWT_SECRET", TEST_SECRET);
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost:5432/clinic_test")
        .expect("lazy pool");
    app::router(AppState::new(pool))
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
