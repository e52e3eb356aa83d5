//! Appointment CRUD. The validation chain confirms both referenced rows
//! exist before anything is written. List and detail responses join in
//! patient and doctor names.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CreatedPayload, DataPayload, MessagePayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{self, chains};

const DETAIL_QUERY: &str = "SELECT a.id, a.date, a.time, a.status, a.notes, \
    a.patient_id, a.doctor_id, \
    p.first_name AS patient_first_name, p.last_name AS patient_last_name, \
    d.first_name AS doctor_first_name, d.last_name AS doctor_last_name, \
    d.specialty AS doctor_specialty \
    FROM appointments a \
    JOIN patients p ON a.patient_id = p.id \
    JOIN doctors d ON a.doctor_id = d.id";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AppointmentDetail {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub doctor_specialty: String,
}

#[derive(Debug, Deserialize)]
struct AppointmentInput {
    date: NaiveDate,
    time: NaiveTime,
    status: Option<String>,
    notes: Option<String>,
}

struct ParsedAppointment {
    patient_id: i64,
    doctor_id: i64,
    input: AppointmentInput,
}

/// The chain has already confirmed both ids are positive integers and
/// reference existing rows; this just lifts them (and the rest of the
/// body) into typed form.
fn parse_input(body: Value) -> Result<ParsedAppointment, ApiError> {
    let patient_id = validation::integer(body.get("patient_id"))
        .ok_or_else(|| ApiError::bad_request("patient_id must be a positive integer"))?;
    let doctor_id = validation::integer(body.get("doctor_id"))
        .ok_or_else(|| ApiError::bad_request("doctor_id must be a positive integer"))?;
    let input: AppointmentInput = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;

    Ok(ParsedAppointment {
        patient_id,
        doctor_id,
        input,
    })
}

/// POST /api/appointments
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<CreatedPayload> {
    validation::run(chains::APPOINTMENT, &body, None, &state.pool).await?;
    let parsed = parse_input(body)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO appointments (patient_id, doctor_id, date, time, status, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(parsed.patient_id)
    .bind(parsed.doctor_id)
    .bind(parsed.input.date)
    .bind(parsed.input.time)
    .bind(parsed.input.status.as_deref().unwrap_or("pending"))
    .bind(&parsed.input.notes)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(CreatedPayload {
        message: "appointment created successfully",
        id,
    }))
}

/// GET /api/appointments
pub async fn list(State(state): State<AppState>) -> ApiResult<DataPayload<Vec<AppointmentDetail>>> {
    let sql = format!("{DETAIL_QUERY} ORDER BY a.date DESC, a.time ASC");
    let appointments = sqlx::query_as::<_, AppointmentDetail>(&sql)
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success(DataPayload { data: appointments }))
}

/// GET /api/appointments/:id
pub async fn get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DataPayload<AppointmentDetail>> {
    let id = validation::validate_id(&raw_id)?;

    let sql = format!("{DETAIL_QUERY} WHERE a.id = $1");
    let appointment = sqlx::query_as::<_, AppointmentDetail>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("appointment not found"))?;

    Ok(ApiResponse::success(DataPayload { data: appointment }))
}

/// PUT /api/appointments/:id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<MessagePayload> {
    let id = validation::validate_id(&raw_id)?;
    validation::run(chains::APPOINTMENT, &body, Some(id), &state.pool).await?;
    let parsed = parse_input(body)?;

    let result = sqlx::query(
        "UPDATE appointments SET patient_id = $1, doctor_id = $2, date = $3, time = $4, \
         status = $5, notes = $6 WHERE id = $7",
    )
    .bind(parsed.patient_id)
    .bind(parsed.doctor_id)
    .bind(parsed.input.date)
    .bind(parsed.input.time)
    .bind(parsed.input.status.as_deref().unwrap_or("pending"))
    .bind(&parsed.input.notes)
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("appointment not found"));
    }
    Ok(ApiResponse::success(MessagePayload {
        message: "appointment updated successfully",
    }))
}

/// Partial update body. The outer `Option` tracks whether the key was
/// present at all, the inner one carries an explicit JSON null, so
/// `{"notes": null}` clears the column while `{}` leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AppointmentPatch {
    #[serde(default, deserialize_with = "present")]
    status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    notes: Option<Option<String>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// PATCH /api/appointments/:id - partial update of status and/or notes
pub async fn patch(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(input): Json<AppointmentPatch>,
) -> ApiResult<MessagePayload> {
    let id = validation::validate_id(&raw_id)?;

    if input.status.is_none() && input.notes.is_none() {
        return Err(ApiError::bad_request(
            "at least one of \"status\" or \"notes\" is required for a partial update",
        ));
    }

    let mut sets = Vec::new();
    let mut position = 1;
    if input.status.is_some() {
        sets.push(format!("status = ${position}"));
        position += 1;
    }
    if input.notes.is_some() {
        sets.push(format!("notes = ${position}"));
        position += 1;
    }
    let sql = format!(
        "UPDATE appointments SET {} WHERE id = ${position}",
        sets.join(", ")
    );

    let mut query = sqlx::query(&sql);
    if let Some(status) = &input.status {
        query = query.bind(status.as_deref());
    }
    if let Some(notes) = &input.notes {
        query = query.bind(notes.as_deref());
    }
    let result = query.bind(id).execute(&state.pool).await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("appointment not found"));
    }
    Ok(ApiResponse::success(MessagePayload {
        message: "appointment updated successfully",
    }))
}

/// DELETE /api/appointments/:id
pub async fn remove(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let id = validation::validate_id(&raw_id)?;

    let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("appointment not found"));
    }
    Ok(ApiResponse::<()>::no_content())
}
