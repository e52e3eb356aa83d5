//! Register and login flows. Neither sits behind the auth gate; both
//! compose the password codec and token service directly.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{self, password};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;
use crate::validation::{self, chains};

/// User shape safe to return to clients. The password hash never leaves
/// the persistence layer.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub message: &'static str,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct RegisterInput {
    name: String,
    email: String,
    password: String,
}

/// The chain compares trimmed values, so persist trimmed values too;
/// otherwise a padded email would pass validation, be stored padded, and
/// dodge every later uniqueness check and login lookup. The password is
/// left untouched - only its presence was checked.
fn parse_register(body: Value) -> Result<RegisterInput, ApiError> {
    let mut input: RegisterInput = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    input.name = input.name.trim().to_string();
    input.email = input.email.trim().to_string();
    Ok(input)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<AuthPayload> {
    validation::run(chains::USER, &body, None, &state.pool).await?;
    let input = parse_register(body)?;

    let password_hash = password::hash(&input.password).await?;

    // The chain already checked uniqueness, but a concurrent register can
    // still trip the constraint; that race is a 409, not a 500.
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::conflict("email already registered"),
        other => other,
    })?;

    let token = auth::issue_token(id, &input.email)?;
    tracing::info!("registered user {} ({})", id, input.email);

    Ok(ApiResponse::created(AuthPayload {
        message: "user registered successfully",
        user: PublicUser {
            id,
            name: input.name,
            email: input.email,
        },
        token,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginInput {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> ApiResult<AuthPayload> {
    // Missing credentials are a 400 before any database work. Emails are
    // stored trimmed, so the lookup uses the trimmed form as well.
    let (email, plaintext) = match (body.email, body.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => {
            (e.trim().to_string(), p)
        }
        _ => return Err(ApiError::bad_request("missing login credentials")),
    };

    let user = sqlx::query_as::<_, UserRecord>(
        "SELECT id, name, email, password FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?
    // Distinguishable messages are intentional, kept from the existing UX
    .ok_or_else(|| ApiError::unauthorized("email not found"))?;

    if !password::verify(&plaintext, &user.password).await? {
        return Err(ApiError::unauthorized("wrong password"));
    }

    let token = auth::issue_token(user.id, &user.email)?;
    tracing::info!("user {} logged in", user.id);

    Ok(ApiResponse::success(AuthPayload {
        message: "login successful",
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        token,
    }))
}

#[derive(Debug, Serialize)]
pub struct WhoamiPayload {
    pub user: CurrentUser,
}

/// GET /api/auth/whoami - echo the identity resolved by the auth gate
pub async fn whoami(Extension(user): Extension<CurrentUser>) -> ApiResult<WhoamiPayload> {
    Ok(ApiResponse::success(WhoamiPayload { user }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_input_is_stored_trimmed() {
        let input = parse_register(json!({
            "name": "  Ana  ",
            "email": "  ana@x.com ",
            "password": "secret123",
        }))
        .expect("parse");

        assert_eq!(input.name, "Ana");
        assert_eq!(input.email, "ana@x.com");
    }

    #[test]
    fn register_password_is_never_trimmed() {
        let input = parse_register(json!({
            "name": "Ana",
            "email": "ana@x.com",
            "password": " spaced pass ",
        }))
        .expect("parse");

        assert_eq!(input.password, " spaced pass ");
    }

    #[test]
    fn register_missing_field_is_bad_request() {
        let err = parse_register(json!({ "email": "ana@x.com" })).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
