use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::bookings::{
    Booking, BookingError, BookingStatus, CheckPriceRequest, InsertOutcome, NewBooking,
    StatusMachine, StatusUpdate,
};
use crate::pricing::{AvailabilityEngine, ReservationStore};

/// Service for booking business logic
#[derive(Clone)]
pub struct BookingService {
    engine: Arc<AvailabilityEngine>,
    reservations: Arc<dyn ReservationStore>,
}

impl BookingService {
    pub fn new(engine: Arc<AvailabilityEngine>, reservations: Arc<dyn ReservationStore>) -> Self {
        Self {
            engine,
            reservations,
        }
    }

    /// Create a pending booking for `user_id`
    ///
    /// Runs the same checks as a price quote, then commits through the
    /// store's atomic check-and-insert so two concurrent requests for
    /// overlapping windows cannot both succeed.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        request: &CheckPriceRequest,
    ) -> Result<Booking, BookingError> {
        let evaluation = self
            .engine
            .evaluate(request.field_id, request.start_time, request.duration)
            .await?;

        let new_booking = NewBooking {
            field_id: evaluation.field.id,
            user_id,
            start_time: evaluation.start,
            end_time: evaluation.end,
            total_price: evaluation.price.total_price,
            status: BookingStatus::Pending,
        };

        match self.reservations.insert_if_no_overlap(&new_booking).await? {
            InsertOutcome::Created(booking) => {
                info!(
                    "Booking {} created for field {} by user {} ({} VND)",
                    booking.id, booking.field_id, user_id, booking.total_price
                );
                Ok(booking)
            }
            InsertOutcome::Conflict(existing) => {
                self.engine.metrics().record_conflict();
                warn!(
                    "Lost booking race on field {} for {}..{}",
                    new_booking.field_id, new_booking.start_time, new_booking.end_time
                );
                Err(match existing {
                    Some(existing) => self.engine.conflict_error(&existing),
                    None => self
                        .engine
                        .window_conflict_error(new_booking.start_time, new_booking.end_time),
                })
            }
        }
    }

    /// Fetch a booking visible to `user` (its owner or an admin)
    pub async fn get_booking(
        &self,
        booking_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .reservations
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.user_id != user.user_id && !user.is_admin() {
            return Err(BookingError::Forbidden(
                "You do not have permission to view this booking".to_string(),
            ));
        }

        Ok(booking)
    }

    /// Move a booking through its lifecycle
    ///
    /// Admins may apply any valid transition. Owners may only cancel.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        user: &AuthenticatedUser,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self.get_booking(booking_id, user).await?;

        if !user.is_admin() && new_status != BookingStatus::Cancelled {
            return Err(BookingError::Forbidden(
                "Customers may only cancel their bookings".to_string(),
            ));
        }

        StatusMachine::transition(booking.status, new_status)
            .map_err(BookingError::InvalidTransition)?;

        if booking.status == new_status {
            return Ok(booking);
        }

        // The write only lands if the status is still the one validated above
        match self
            .reservations
            .update_status(booking_id, booking.status, new_status)
            .await?
        {
            StatusUpdate::Updated(updated) => {
                info!(
                    "Booking {} moved from {} to {} by user {}",
                    booking_id, booking.status, updated.status, user.user_id
                );
                Ok(updated)
            }
            StatusUpdate::Stale => {
                let current = self
                    .reservations
                    .find_by_id(booking_id)
                    .await?
                    .ok_or(BookingError::BookingNotFound(booking_id))?;
                warn!(
                    "Booking {} changed from {} to {} before it could move to {}",
                    booking_id, booking.status, current.status, new_status
                );
                Err(BookingError::InvalidTransition(format!(
                    "Booking {} is now {}; cannot move it to {}",
                    booking_id, current.status, new_status
                )))
            }
            StatusUpdate::Conflict => {
                self.engine.metrics().record_conflict();
                Err(self
                    .engine
                    .window_conflict_error(booking.start_time, booking.end_time))
            }
        }
    }
}
