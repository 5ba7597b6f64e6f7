use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::AppointmentStatus;
use crate::validation::ValidationError;

/* -------------------------
   Repository errors
--------------------------*/

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error(
        "appointment status cannot move from {} to {to}",
        .from.map(|s| s.as_str()).unwrap_or("NEW")
    )]
    InvalidTransition {
        from: Option<AppointmentStatus>,
        to: AppointmentStatus,
    },

    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

// Postgres SQLSTATE codes we classify.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            let message = db.message().to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION | NOT_NULL_VIOLATION) => {
                    return DbError::ConstraintViolation(message);
                }
                Some(
                    CHECK_VIOLATION | INVALID_TEXT_REPRESENTATION | NUMERIC_VALUE_OUT_OF_RANGE,
                ) => {
                    return DbError::Validation(ValidationError::Invalid {
                        field: "record",
                        reason: message,
                    });
                }
                _ => {}
            }
        }

        if matches!(
            e,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
        ) {
            return DbError::Unavailable(e.to_string());
        }

        DbError::Sqlx(e)
    }
}

/* -------------------------
   HTTP errors
--------------------------*/

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
        })
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        let message = e.to_string();
        match e {
            DbError::NotFound { .. } => ApiError::NotFound("NOT_FOUND", message),
            DbError::ConstraintViolation(_) => ApiError::Conflict("CONSTRAINT_VIOLATION", message),
            DbError::Validation(_) => ApiError::BadRequest("VALIDATION_ERROR", message),
            DbError::Conflict(_) => ApiError::Conflict("APPOINTMENT_CONFLICT", message),
            DbError::InvalidTransition { .. } => {
                ApiError::Conflict("INVALID_STATUS_TRANSITION", message)
            }
            DbError::Unavailable(_) => ApiError::Unavailable(message),
            DbError::Sqlx(_) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Conflict(code, msg) => {
                (StatusCode::CONFLICT, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Unavailable(msg) => {
                tracing::error!("store unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiError::to_error_response("UNAVAILABLE", "database is unavailable"),
                )
                    .into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::to_error_response("INTERNAL", "internal server error"),
                )
                    .into_response()
            }
        }
    }
}
