//! User CRUD. All routes protected; the validation chain re-checks email
//! uniqueness with the edited row excluded.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{DataPayload, MessagePayload};
use crate::auth::password;
use crate::error::ApiError;
use crate::handlers::auth::PublicUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{self, chains};

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> ApiResult<DataPayload<Vec<PublicUser>>> {
    let users = sqlx::query_as::<_, PublicUser>("SELECT id, name, email FROM users ORDER BY id")
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success(DataPayload { data: users }))
}

/// GET /api/users/:id
pub async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DataPayload<PublicUser>> {
    let id = validation::validate_id(&raw_id)?;

    let user = sqlx::query_as::<_, PublicUser>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(ApiResponse::success(DataPayload { data: user }))
}

#[derive(Debug, Deserialize)]
struct UserUpdateInput {
    name: String,
    email: String,
    password: String,
}

/// Persist the trimmed values the chain validated; the password is only
/// presence-checked and stays untouched.
fn parse_input(body: Value) -> Result<UserUpdateInput, ApiError> {
    let mut input: UserUpdateInput = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    input.name = input.name.trim().to_string();
    input.email = input.email.trim().to_string();
    Ok(input)
}

/// PUT /api/users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<MessagePayload> {
    let id = validation::validate_id(&raw_id)?;
    validation::run(chains::USER, &body, Some(id), &state.pool).await?;
    let input = parse_input(body)?;

    let password_hash = password::hash(&input.password).await?;

    let result = sqlx::query("UPDATE users SET name = $1, email = $2, password = $3 WHERE id = $4")
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("user not found"));
    }
    Ok(ApiResponse::success(MessagePayload {
        message: "user updated successfully",
    }))
}

/// DELETE /api/users/:id
pub async fn remove(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let id = validation::validate_id(&raw_id)?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("user not found"));
    }
    Ok(ApiResponse::<()>::no_content())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_input;

    #[test]
    fn update_input_is_stored_trimmed() {
        let input = parse_input(json!({
            "name": "  Ana  ",
            "email": "  ana@clinic.test  ",
            "password": "secret123",
        }))
        .unwrap();
        assert_eq!(input.name, "Ana");
        assert_eq!(input.email, "ana@clinic.test");
    }

    #[test]
    fn update_password_is_never_trimmed() {
        let input = parse_input(json!({
            "name": "Ana",
            "email": "ana@clinic.test",
            "password": "  spaces matter  ",
        }))
        .unwrap();
        assert_eq!(input.password, "  spaces matter  ");
    }
}
