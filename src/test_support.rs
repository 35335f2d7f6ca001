// In-memory stores and fixtures shared by unit and HTTP tests

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Ho_Chi_Minh;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus, InsertOutcome, NewBooking, StatusUpdate};
use crate::fields::{Field, FieldType, NewTimeSlot, TimeSlot};
use crate::pricing::overlap::intervals_overlap;
use crate::pricing::{Clock, FieldStore, ReservationStore, TierStore, NON_BLOCKING_STATUSES};

/// Wall-clock time in Ho Chi Minh City as a UTC instant
pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Ho_Chi_Minh
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn sample_field(name: &str, active: bool) -> Field {
    let now = Utc::now();
    Field {
        id: Uuid::new_v4(),
        name: name.to_string(),
        status: active,
        field_type_id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn field_type_of(field: &Field) -> FieldType {
    FieldType {
        id: field.field_type_id,
        name: format!("Type of {}", field.name),
        description: None,
    }
}

/// Field store that also knows the field type of every field it holds
#[derive(Default)]
pub struct MemoryFieldStore {
    fields: Mutex<HashMap<Uuid, Field>>,
    field_types: Mutex<HashMap<Uuid, FieldType>>,
}

impl MemoryFieldStore {
    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            field_types: Mutex::new(
                fields
                    .iter()
                    .map(|f| (f.field_type_id, field_type_of(f)))
                    .collect(),
            ),
            fields: Mutex::new(fields.into_iter().map(|f| (f.id, f)).collect()),
        }
    }

    pub async fn insert(&self, field: Field) {
        self.field_types
            .lock()
            .await
            .insert(field.field_type_id, field_type_of(&field));
        self.fields.lock().await.insert(field.id, field);
    }
}

#[async_trait]
impl FieldStore for MemoryFieldStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Field>, sqlx::Error> {
        Ok(self.fields.lock().await.get(&id).cloned())
    }

    async fn find_field_type(&self, id: Uuid) -> Result<Option<FieldType>, sqlx::Error> {
        Ok(self.field_types.lock().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryTierStore {
    slots: Mutex<Vec<TimeSlot>>,
}

#[async_trait]
impl TierStore for MemoryTierStore {
    async fn find_matching_tier(
        &self,
        field_type_id: Uuid,
        time_of_day: NaiveTime,
    ) -> Result<Option<TimeSlot>, sqlx::Error> {
        let slots = self.slots.lock().await;
        Ok(slots
            .iter()
            .filter(|s| s.field_type_id == field_type_id && s.covers(time_of_day))
            .min_by_key(|s| s.start_time)
            .cloned())
    }

    async fn list_for_type(&self, field_type_id: Uuid) -> Result<Vec<TimeSlot>, sqlx::Error> {
        let slots = self.slots.lock().await;
        let mut matching: Vec<TimeSlot> = slots
            .iter()
            .filter(|s| s.field_type_id == field_type_id)
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.start_time);
        Ok(matching)
    }

    async fn create(&self, slot: &NewTimeSlot) -> Result<TimeSlot, sqlx::Error> {
        let created = TimeSlot {
            id: Uuid::new_v4(),
            field_type_id: slot.field_type_id,
            start_time: slot.start_time,
            end_time: slot.end_time,
            price_per_hour: slot.price_per_hour,
            is_peak_hour: slot.is_peak_hour,
        };
        self.slots.lock().await.push(created.clone());
        Ok(created)
    }
}

/// Reservation store whose check-and-insert holds one lock for both steps
#[derive(Default)]
pub struct MemoryReservationStore {
    bookings: Mutex<Vec<Booking>>,
}

impl MemoryReservationStore {
    /// Store a booking as-is, bypassing the overlap check
    pub async fn insert_raw(&self, booking: Booking) {
        self.bookings.lock().await.push(booking);
    }

    pub async fn all(&self) -> Vec<Booking> {
        self.bookings.lock().await.clone()
    }
}

fn first_overlap<'a>(
    bookings: &'a [Booking],
    field_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: &[BookingStatus],
) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        b.field_id == field_id
            && !exclude.contains(&b.status)
            && intervals_overlap(b.start_time, b.end_time, start, end)
    })
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn find_overlapping(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: &[BookingStatus],
    ) -> Result<Option<Booking>, sqlx::Error> {
        let bookings = self.bookings.lock().await;
        Ok(first_overlap(&bookings, field_id, start, end, exclude).cloned())
    }

    async fn insert_if_no_overlap(&self, booking: &NewBooking) -> Result<InsertOutcome, sqlx::Error> {
        let mut bookings = self.bookings.lock().await;
        if let Some(existing) = first_overlap(
            &bookings,
            booking.field_id,
            booking.start_time,
            booking.end_time,
            NON_BLOCKING_STATUSES,
        ) {
            return Ok(InsertOutcome::Conflict(Some(existing.clone())));
        }

        let now = Utc::now();
        let created = Booking {
            id: Uuid::new_v4(),
            field_id: booking.field_id,
            user_id: booking.user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            total_price: booking.total_price,
            status: booking.status,
            created_at: now,
            updated_at: now,
        };
        bookings.push(created.clone());
        Ok(InsertOutcome::Created(created))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        Ok(self.bookings.lock().await.iter().find(|b| b.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<StatusUpdate, sqlx::Error> {
        let mut bookings = self.bookings.lock().await;
        let Some(index) = bookings.iter().position(|b| b.id == id && b.status == from) else {
            return Ok(StatusUpdate::Stale);
        };

        // Mirrors the exclusion constraint when a booking reclaims its window
        if !NON_BLOCKING_STATUSES.contains(&to) {
            let target = &bookings[index];
            let clash = bookings.iter().any(|b| {
                b.id != id
                    && b.field_id == target.field_id
                    && !NON_BLOCKING_STATUSES.contains(&b.status)
                    && intervals_overlap(b.start_time, b.end_time, target.start_time, target.end_time)
            });
            if clash {
                return Ok(StatusUpdate::Conflict);
            }
        }

        let booking = &mut bookings[index];
        booking.status = to;
        booking.updated_at = Utc::now();
        Ok(StatusUpdate::Updated(booking.clone()))
    }

    async fn expire_pending(&self, created_before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let mut bookings = self.bookings.lock().await;
        let mut expired = 0;
        for booking in bookings
            .iter_mut()
            .filter(|b| b.status == BookingStatus::Pending && b.created_at < created_before)
        {
            booking.status = BookingStatus::Cancelled;
            booking.updated_at = Utc::now();
            expired += 1;
        }
        Ok(expired)
    }
}
