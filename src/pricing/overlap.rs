// Overlap Checker
//
// Finds an existing non-cancelled booking whose window intersects the request.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus};
use crate::pricing::ports::ReservationStore;

/// Statuses that never occupy a window
pub const NON_BLOCKING_STATUSES: &[BookingStatus] = &[BookingStatus::Cancelled];

/// Half-open interval overlap: touching endpoints do not overlap
pub fn intervals_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

pub struct OverlapChecker {
    reservations: Arc<dyn ReservationStore>,
}

impl OverlapChecker {
    pub fn new(reservations: Arc<dyn ReservationStore>) -> Self {
        Self { reservations }
    }

    /// Return any booking of `field_id` that conflicts with `[start, end)`
    pub async fn find_conflict(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Booking>, sqlx::Error> {
        self.reservations
            .find_overlapping(field_id, start, end, NON_BLOCKING_STATUSES)
            .await
    }
}
