use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::ErrorResponse;

/// Error types for availability checks and booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Past start time, bad duration and other malformed requests
    #[error("{0}")]
    InvalidRequest(String),

    /// Requested window falls outside business hours
    #[error("{0}")]
    OperatingHours(String),

    #[error("Field with id {0} not found")]
    FieldNotFound(Uuid),

    #[error("Field {0} is currently not available for booking")]
    FieldInactive(Uuid),

    /// Another booking already occupies (part of) the requested window
    #[error("{0}")]
    SchedulingConflict(String),

    #[error("Booking with id {0} not found")]
    BookingNotFound(Uuid),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::InvalidRequest(_)
            | BookingError::OperatingHours(_)
            | BookingError::FieldInactive(_)
            | BookingError::InvalidTransition(_)
            | BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::FieldNotFound(_) | BookingError::BookingNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            BookingError::SchedulingConflict(_) => StatusCode::CONFLICT,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BookingError::InvalidRequest(_) => "INVALID_REQUEST",
            BookingError::OperatingHours(_) => "OPERATING_HOURS_VIOLATION",
            BookingError::FieldNotFound(_) => "FIELD_NOT_FOUND",
            BookingError::FieldInactive(_) => "FIELD_INACTIVE",
            BookingError::SchedulingConflict(_) => "SCHEDULING_CONFLICT",
            BookingError::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            BookingError::InvalidTransition(_) => "INVALID_TRANSITION",
            BookingError::Forbidden(_) => "FORBIDDEN",
            BookingError::Validation(_) => "VALIDATION_ERROR",
            BookingError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            BookingError::DatabaseError(e) => {
                error!("Database error: {:?}", e);
                ErrorResponse::new(self.error_code(), "A database error occurred")
            }
            BookingError::Validation(errors) => {
                debug!("Validation error: {:?}", errors);
                ErrorResponse::new(self.error_code(), "Request validation failed")
                    .with_details(serde_json::to_value(errors).unwrap_or(serde_json::json!({})))
            }
            BookingError::SchedulingConflict(message) | BookingError::Forbidden(message) => {
                warn!("{}: {}", self.error_code(), message);
                ErrorResponse::new(self.error_code(), message.clone())
            }
            _ => {
                debug!("{}: {}", self.error_code(), self);
                ErrorResponse::new(self.error_code(), self.to_string())
            }
        };

        body.into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            BookingError::OperatingHours("closed".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BookingError::FieldInactive(Uuid::nil()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BookingError::FieldNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BookingError::SchedulingConflict("taken".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_inactive_and_operating_hours_are_distinguishable() {
        let inactive = BookingError::FieldInactive(Uuid::nil());
        let hours = BookingError::OperatingHours("Bookings must start between 06:00 and 22:00".into());
        assert_ne!(inactive.error_code(), hours.error_code());
        assert_ne!(inactive.to_string(), hours.to_string());
    }

    #[test]
    fn test_error_from_sqlx() {
        let error: BookingError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, BookingError::DatabaseError(_)));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
