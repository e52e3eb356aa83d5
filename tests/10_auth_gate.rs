mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;

use clinic_api::auth::Claims;

#[tokio::test]
async fn protected_route_without_header_is_401() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(Request::builder().uri("/api/users").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "missing Authorization header");
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_401() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_401() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/whoami")
                .header("authorization", "Bearer not.a.token")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(res).await;
    assert_eq!(body["message"], "invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_401() -> Result<()> {
    let app = common::test_app();

    // Signed with the right secret but expired well past the leeway window
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        email: "old@x.com".to_string(),
        iat: now - 5 * 3600,
        exp: now - 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(common::TEST_SECRET.as_bytes()),
    )?;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/whoami")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(res).await;
    assert_eq!(body["message"], "invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_401() -> Result<()> {
    let app = common::test_app();

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        email: "mallory@x.com".to_string(),
        iat: now,
        exp: now + 4 * 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )?;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn partial_appointment_update_is_gated() -> Result<()> {
    let app = common::test_app();

    let res = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/appointments/1")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"status":"confirmed"}"#))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(res).await;
    assert_eq!(body["message"], "missing Authorization header");
    Ok(())
}
