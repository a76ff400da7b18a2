// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{AppointmentError, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::state::AppointmentCellState;

/// Every admission outcome keeps its own response category.
pub fn map_appointment_error(error: AppointmentError) -> AppError {
    let message = error.to_string();
    match error {
        AppointmentError::NotFound(_)
        | AppointmentError::DoctorNotFound(_)
        | AppointmentError::PatientNotFound(_) => AppError::NotFound(message),
        AppointmentError::DoctorNotAvailable(_) => AppError::Unavailable(message),
        AppointmentError::ConflictDetected { .. } => AppError::Conflict(message),
        AppointmentError::UpstreamFailure { .. } => AppError::ExternalService(message),
        AppointmentError::InvalidInput(_) => AppError::ValidationError(message),
        AppointmentError::DatabaseError(_) => AppError::Database(message),
    }
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::ValidationError(rejection.body_text())
}

fn invalid_path(rejection: PathRejection) -> AppError {
    AppError::ValidationError(rejection.body_text())
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let appointment = state
        .booking
        .create_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppointmentCellState>>,
) -> Result<Json<Value>, AppError> {
    let appointments = state
        .booking
        .list_appointments()
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    appointment_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(appointment_id) = appointment_id.map_err(invalid_path)?;

    let appointment = state
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    appointment_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(appointment_id) = appointment_id.map_err(invalid_path)?;
    let Json(request) = payload.map_err(invalid_body)?;

    let appointment = state
        .booking
        .update_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    appointment_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(appointment_id) = appointment_id.map_err(invalid_path)?;

    state
        .booking
        .delete_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_upcoming_appointments(
    State(state): State<Arc<AppointmentCellState>>,
) -> Result<Json<Value>, AppError> {
    let upcoming = state
        .upcoming
        .get_upcoming_appointments(Local::now())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(upcoming)))
}
