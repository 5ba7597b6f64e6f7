// src/routes/appointment_routes.rs

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::extract::{IdPath, JsonBody};
use crate::{
    error::ApiError,
    models::{AppState, Appointment, AppointmentInput},
    repo::AppointmentRepo,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route(
            "/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
}

pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(AppointmentRepo::new(&state.db).list().await?))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(AppointmentRepo::new(&state.db).get(id).await?))
}

/// 409 when the employee is already booked or the initial status is not
/// SCHEDULED/CONFIRMED.
pub async fn create_appointment(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = AppointmentRepo::new(&state.db).create(&req).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<AppointmentInput>,
) -> Result<Json<Appointment>, ApiError> {
    Ok(Json(AppointmentRepo::new(&state.db).update(id, &req).await?))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    AppointmentRepo::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
