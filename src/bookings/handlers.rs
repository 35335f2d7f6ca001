// HTTP handlers for price checks and bookings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::bookings::{Booking, BookingError, CheckPriceRequest, UpdateBookingStatusRequest};
use crate::pricing::{AvailabilityQuote, MetricsSummary};
use crate::AppState;

/// Handler for POST /api/bookings/check-price
/// Quotes a window without reserving it
pub async fn check_price_handler(
    State(state): State<AppState>,
    Json(request): Json<CheckPriceRequest>,
) -> Result<Json<AvailabilityQuote>, BookingError> {
    request.validate()?;

    debug!(
        "Price check for field {} at {} ({} minutes)",
        request.field_id, request.start_time, request.duration
    );

    let quote = state
        .engine
        .check_availability_and_price(request.field_id, request.start_time, request.duration)
        .await?;

    Ok(Json(quote))
}

/// Handler for POST /api/bookings
/// Creates a pending booking for the authenticated user
pub async fn create_booking_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CheckPriceRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    request.validate()?;

    let booking = state
        .booking_service
        .create_booking(user.user_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/bookings/:id
pub async fn get_booking_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.booking_service.get_booking(booking_id, &user).await?;
    Ok(Json(booking))
}

/// Handler for PATCH /api/bookings/:id/status
pub async fn update_booking_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state
        .booking_service
        .update_status(booking_id, &user, request.status)
        .await?;

    Ok(Json(booking))
}

/// Handler for GET /api/admin/engine-metrics
pub async fn engine_metrics_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Json<MetricsSummary> {
    Json(state.engine.metrics().summary())
}
