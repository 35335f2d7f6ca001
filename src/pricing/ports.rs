// Collaborator interfaces consumed by the availability engine
//
// PostgreSQL implementations live next to the owning module's repository;
// tests plug in in-memory versions.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus, InsertOutcome, NewBooking, StatusUpdate};
use crate::fields::{Field, FieldType, NewTimeSlot, TimeSlot};

#[async_trait]
pub trait FieldStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Field>, sqlx::Error>;

    async fn find_field_type(&self, id: Uuid) -> Result<Option<FieldType>, sqlx::Error>;
}

#[async_trait]
pub trait TierStore: Send + Sync {
    /// Slot of `field_type_id` whose `[start_time, end_time)` contains `time_of_day`
    async fn find_matching_tier(
        &self,
        field_type_id: Uuid,
        time_of_day: NaiveTime,
    ) -> Result<Option<TimeSlot>, sqlx::Error>;

    async fn list_for_type(&self, field_type_id: Uuid) -> Result<Vec<TimeSlot>, sqlx::Error>;

    async fn create(&self, slot: &NewTimeSlot) -> Result<TimeSlot, sqlx::Error>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Any booking of `field_id` overlapping `[start, end)` whose status is not in `exclude`
    async fn find_overlapping(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: &[BookingStatus],
    ) -> Result<Option<Booking>, sqlx::Error>;

    /// Re-check for overlap and insert as one atomic step
    async fn insert_if_no_overlap(&self, booking: &NewBooking) -> Result<InsertOutcome, sqlx::Error>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error>;

    /// Move booking `id` from `from` to `to`, only if it still holds `from`
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<StatusUpdate, sqlx::Error>;

    /// Cancel pending bookings created before `created_before`, returning how many changed
    async fn expire_pending(&self, created_before: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
