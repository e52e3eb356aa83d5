//! Patient CRUD. Reads are public; mutations sit behind the auth gate and
//! the DNI validation chain.

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CreatedPayload, DataPayload, MessagePayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{self, chains};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub birth_date: NaiveDate,
    pub insurance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PatientInput {
    first_name: String,
    last_name: String,
    dni: String,
    birth_date: NaiveDate,
    insurance: Option<String>,
}

/// The chain checks the DNI trimmed, so the row must store it trimmed too.
fn parse_input(body: Value) -> Result<PatientInput, ApiError> {
    let mut input: PatientInput = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    input.first_name = input.first_name.trim().to_string();
    input.last_name = input.last_name.trim().to_string();
    input.dni = input.dni.trim().to_string();
    Ok(input)
}

/// POST /api/patients
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<CreatedPayload> {
    validation::run(chains::PATIENT, &body, None, &state.pool).await?;
    let input = parse_input(body)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO patients (first_name, last_name, dni, birth_date, insurance) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.dni)
    .bind(input.birth_date)
    .bind(&input.insurance)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(CreatedPayload {
        message: "patient created successfully",
        id,
    }))
}

/// GET /api/patients
pub async fn list(State(state): State<AppState>) -> ApiResult<DataPayload<Vec<Patient>>> {
    let patients = sqlx::query_as::<_, Patient>(
        "SELECT id, first_name, last_name, dni, birth_date, insurance FROM patients ORDER BY id",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(ApiResponse::success(DataPayload { data: patients }))
}

/// GET /api/patients/:id
pub async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DataPayload<Patient>> {
    let id = validation::validate_id(&raw_id)?;

    let patient = sqlx::query_as::<_, Patient>(
        "SELECT id, first_name, last_name, dni, birth_date, insurance FROM patients WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("patient not found"))?;

    Ok(ApiResponse::success(DataPayload { data: patient }))
}

/// PUT /api/patients/:id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<MessagePayload> {
    let id = validation::validate_id(&raw_id)?;
    // Editing a patient may keep its own DNI; the chain excludes this row
    validation::run(chains::PATIENT, &body, Some(id), &state.pool).await?;
    let input = parse_input(body)?;

    let result = sqlx::query(
        "UPDATE patients SET first_name = $1, last_name = $2, dni = $3, birth_date = $4, \
         insurance = $5 WHERE id = $6",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.dni)
    .bind(input.birth_date)
    .bind(&input.insurance)
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("patient not found"));
    }
    Ok(ApiResponse::success(MessagePayload {
        message: "patient updated successfully",
    }))
}

/// DELETE /api/patients/:id
pub async fn remove(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let id = validation::validate_id(&raw_id)?;

    let result = sqlx::query("DELETE FROM patients WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("patient not found"));
    }
    Ok(ApiResponse::<()>::no_content())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_input;

    #[test]
    fn padded_dni_is_stored_trimmed() {
        let input = parse_input(json!({
            "first_name": "Mario",
            "last_name": "Rossi",
            "dni": "  30123456  ",
            "birth_date": "1990-05-14",
        }))
        .unwrap();
        assert_eq!(input.dni, "30123456");
    }

    #[test]
    fn names_are_stored_trimmed() {
        let input = parse_input(json!({
            "first_name": " Mario ",
            "last_name": " Rossi ",
            "dni": "30123456",
            "birth_date": "1990-05-14",
        }))
        .unwrap();
        assert_eq!(input.first_name, "Mario");
        assert_eq!(input.last_name, "Rossi");
    }

    #[test]
    fn malformed_date_is_bad_request() {
        let err = parse_input(json!({
            "first_name": "Mario",
            "last_name": "Rossi",
            "dni": "30123456",
            "birth_date": "not-a-date",
        }))
        .unwrap_err();
        assert!(matches!(err, crate::error::ApiError::BadRequest(_)));
    }
}
