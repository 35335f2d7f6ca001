use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::bookings::{Booking, BookingStatus, InsertOutcome, NewBooking, StatusUpdate};
use crate::pricing::{ReservationStore, NON_BLOCKING_STATUSES};

/// SQLSTATE raised by the `bookings_no_overlap` exclusion constraint
const EXCLUSION_VIOLATION: &str = "23P01";

const BOOKING_COLUMNS: &str =
    "id, field_id, user_id, start_time, end_time, total_price, status, created_at, updated_at";

/// Repository for booking operations
#[derive(Clone)]
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn overlapping_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        booking: &NewBooking,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE field_id = $1 AND start_time < $3 AND end_time > $2 AND status <> ALL($4)
            ORDER BY start_time
            LIMIT 1
            "#
        ))
        .bind(booking.field_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(status_names(NON_BLOCKING_STATUSES))
        .fetch_optional(&mut **tx)
        .await
    }
}

fn status_names(statuses: &[BookingStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn is_exclusion_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(EXCLUSION_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn find_overlapping(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: &[BookingStatus],
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE field_id = $1 AND start_time < $3 AND end_time > $2 AND status <> ALL($4)
            ORDER BY start_time
            LIMIT 1
            "#
        ))
        .bind(field_id)
        .bind(start)
        .bind(end)
        .bind(status_names(exclude))
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_if_no_overlap(&self, booking: &NewBooking) -> Result<InsertOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Serializes writers per field until commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(booking.field_id)
            .execute(&mut *tx)
            .await?;

        if let Some(existing) = Self::overlapping_in_tx(&mut tx, booking).await? {
            tx.rollback().await?;
            return Ok(InsertOutcome::Conflict(Some(existing)));
        }

        let inserted = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (field_id, user_id, start_time, end_time, total_price, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.field_id)
        .bind(booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.total_price)
        .bind(booking.status)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(created) => {
                tx.commit().await?;
                Ok(InsertOutcome::Created(created))
            }
            Err(e) if is_exclusion_violation(&e) => {
                tracing::warn!(
                    "Exclusion constraint rejected booking on field {} ({}..{})",
                    booking.field_id,
                    booking.start_time,
                    booking.end_time
                );
                Ok(InsertOutcome::Conflict(None))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<StatusUpdate, sqlx::Error> {
        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(to)
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(Some(booking)) => Ok(StatusUpdate::Updated(booking)),
            Ok(None) => Ok(StatusUpdate::Stale),
            Err(e) if is_exclusion_violation(&e) => {
                tracing::warn!(
                    "Exclusion constraint rejected moving booking {} from {} to {}",
                    id,
                    from,
                    to
                );
                Ok(StatusUpdate::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    async fn expire_pending(&self, created_before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE status = $2 AND created_at < $3
            "#,
        )
        .bind(BookingStatus::Cancelled)
        .bind(BookingStatus::Pending)
        .bind(created_before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
