//! Doctor CRUD. Reads are public; mutations sit behind the auth gate and
//! the license-number validation chain.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CreatedPayload, DataPayload, MessagePayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{self, chains};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Doctor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub license_number: String,
}

#[derive(Debug, Deserialize)]
struct DoctorInput {
    first_name: String,
    last_name: String,
    specialty: String,
    license_number: String,
}

/// The chain checks the license number trimmed, so store it trimmed as well.
fn parse_input(body: Value) -> Result<DoctorInput, ApiError> {
    let mut input: DoctorInput = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    input.first_name = input.first_name.trim().to_string();
    input.last_name = input.last_name.trim().to_string();
    input.specialty = input.specialty.trim().to_string();
    input.license_number = input.license_number.trim().to_string();
    Ok(input)
}

/// POST /api/doctors
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<CreatedPayload> {
    validation::run(chains::DOCTOR, &body, None, &state.pool).await?;
    let input = parse_input(body)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO doctors (first_name, last_name, specialty, license_number) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.specialty)
    .bind(&input.license_number)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(CreatedPayload {
        message: "doctor created successfully",
        id,
    }))
}

/// GET /api/doctors
pub async fn list(State(state): State<AppState>) -> ApiResult<DataPayload<Vec<Doctor>>> {
    let doctors = sqlx::query_as::<_, Doctor>(
        "SELECT id, first_name, last_name, specialty, license_number FROM doctors ORDER BY id",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(ApiResponse::success(DataPayload { data: doctors }))
}

/// GET /api/doctors/:id
pub async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DataPayload<Doctor>> {
    let id = validation::validate_id(&raw_id)?;

    let doctor = sqlx::query_as::<_, Doctor>(
        "SELECT id, first_name, last_name, specialty, license_number FROM doctors WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("doctor not found"))?;

    Ok(ApiResponse::success(DataPayload { data: doctor }))
}

/// PUT /api/doctors/:id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<MessagePayload> {
    let id = validation::validate_id(&raw_id)?;
    validation::run(chains::DOCTOR, &body, Some(id), &state.pool).await?;
    let input = parse_input(body)?;

    let result = sqlx::query(
        "UPDATE doctors SET first_name = $1, last_name = $2, specialty = $3, \
         license_number = $4 WHERE id = $5",
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.specialty)
    .bind(&input.license_number)
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("doctor not found"));
    }
    Ok(ApiResponse::success(MessagePayload {
        message: "doctor updated successfully",
    }))
}

/// DELETE /api/doctors/:id
pub async fn remove(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let id = validation::validate_id(&raw_id)?;

    let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("doctor not found"));
    }
    Ok(ApiResponse::<()>::no_content())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_input;

    #[test]
    fn padded_license_number_is_stored_trimmed() {
        let input = parse_input(json!({
            "first_name": "Laura",
            "last_name": "Gomez",
            "specialty": "  cardiology ",
            "license_number": "  MP-4410  ",
        }))
        .unwrap();
        assert_eq!(input.license_number, "MP-4410");
        assert_eq!(input.specialty, "cardiology");
    }
}
