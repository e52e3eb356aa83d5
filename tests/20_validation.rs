mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

fn json_post(uri: &str, body: serde_json::Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn register_aggregates_every_failing_field() -> Result<()> {
    let app = common::test_app();

    // name and password missing, email malformed: the malformed email
    // short-circuits before the uniqueness check, so no database is needed
    let res = app
        .oneshot(json_post("/api/auth/register", json!({ "email": "nope" }))?)
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(res).await;
    assert_eq!(body["success"], false);

    let errors = body["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 3);
    // Reported in chain-declared order, not just the first failure
    assert_eq!(errors[0]["field"], "name");
    assert_eq!(errors[1]["field"], "email");
    assert_eq!(errors[1]["message"], "invalid email");
    assert_eq!(errors[2]["field"], "password");
    Ok(())
}

#[tokio::test]
async fn login_with_missing_fields_is_400_before_any_lookup() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(json_post("/api/auth/login", json!({ "email": "ana@x.com" }))?)
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(res).await;
    assert_eq!(body["message"], "missing login credentials");
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_param_is_400_with_field_entry() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/patients/abc")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(res).await;
    let errors = body["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], "id");
    Ok(())
}

#[tokio::test]
async fn zero_id_param_is_rejected() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/doctors/0")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn mutations_are_gated_before_validation_runs() -> Result<()> {
    let app = common::test_app();

    // Invalid body AND no token: the auth gate answers first
    let res = app
        .oneshot(json_post("/api/patients", json!({ "dni": "x" }))?)
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
