//! Router assembly. The pipeline for every route is explicit here:
//! protected routes pass through the `protect` gate before their handler;
//! validation chains run inside the handlers that declare them.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db;
use crate::handlers::{appointments, auth, doctors, patients, users};
use crate::middleware::protect;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(patient_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route_layer(from_fn_with_state(state, protect));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users", get(users::list))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::remove),
        )
        .route_layer(from_fn_with_state(state, protect))
}

fn patient_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/patients", post(patients::create))
        .route(
            "/api/patients/:id",
            axum::routing::put(patients::update).delete(patients::remove),
        )
        .route_layer(from_fn_with_state(state, protect));

    Router::new()
        .route("/api/patients", get(patients::list))
        .route("/api/patients/:id", get(patients::get))
        .merge(protected)
}

fn doctor_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/doctors", post(doctors::create))
        .route(
            "/api/doctors/:id",
            axum::routing::put(doctors::update).delete(doctors::remove),
        )
        .route_layer(from_fn_with_state(state, protect));

    Router::new()
        .route("/api/doctors", get(doctors::list))
        .route("/api/doctors/:id", get(doctors::get))
        .merge(protected)
}

fn appointment_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/appointments", post(appointments::create))
        .route(
            "/api/appointments/:id",
            axum::routing::put(appointments::update)
                .patch(appointments::patch)
                .delete(appointments::remove),
        )
        .route_layer(from_fn_with_state(state, protect));

    Router::new()
        .route("/api/appointments", get(appointments::list))
        .route("/api/appointments/:id", get(appointments::get))
        .merge(protected)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Clinic API",
            "version": version,
            "endpoints": {
                "auth": "/api/auth/register, /api/auth/login (public), /api/auth/whoami (protected)",
                "users": "/api/users[/:id] (protected)",
                "patients": "/api/patients[/:id] (GET public, mutations protected)",
                "doctors": "/api/doctors[/:id] (GET public, mutations protected)",
                "appointments": "/api/appointments[/:id] (GET public, mutations protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "message": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
