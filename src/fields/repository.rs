use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::PgPool;
use uuid::Uuid;

use crate::fields::{Field, FieldType, NewTimeSlot, TimeSlot};
use crate::pricing::{FieldStore, TierStore};

/// Repository for fields and field types
#[derive(Clone)]
pub struct PgFieldStore {
    pool: PgPool,
}

impl PgFieldStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FieldStore for PgFieldStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Field>, sqlx::Error> {
        sqlx::query_as::<_, Field>(
            "SELECT id, name, status, field_type_id, created_at, updated_at FROM fields WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_field_type(&self, id: Uuid) -> Result<Option<FieldType>, sqlx::Error> {
        sqlx::query_as::<_, FieldType>(
            "SELECT id, name, description FROM field_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Repository for time slot (price tier) operations
#[derive(Clone)]
pub struct PgTierStore {
    pool: PgPool,
}

impl PgTierStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TierStore for PgTierStore {
    async fn find_matching_tier(
        &self,
        field_type_id: Uuid,
        time_of_day: NaiveTime,
    ) -> Result<Option<TimeSlot>, sqlx::Error> {
        // Overlapping slots resolve to the earliest-starting one
        sqlx::query_as::<_, TimeSlot>(
            r#"
            SELECT id, field_type_id, start_time, end_time, price_per_hour, is_peak_hour
            FROM time_slots
            WHERE field_type_id = $1 AND start_time <= $2 AND end_time > $2
            ORDER BY start_time
            LIMIT 1
            "#,
        )
        .bind(field_type_id)
        .bind(time_of_day)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_for_type(&self, field_type_id: Uuid) -> Result<Vec<TimeSlot>, sqlx::Error> {
        sqlx::query_as::<_, TimeSlot>(
            r#"
            SELECT id, field_type_id, start_time, end_time, price_per_hour, is_peak_hour
            FROM time_slots
            WHERE field_type_id = $1
            ORDER BY start_time
            "#,
        )
        .bind(field_type_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create(&self, slot: &NewTimeSlot) -> Result<TimeSlot, sqlx::Error> {
        sqlx::query_as::<_, TimeSlot>(
            r#"
            INSERT INTO time_slots (field_type_id, start_time, end_time, price_per_hour, is_peak_hour)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, field_type_id, start_time, end_time, price_per_hour, is_peak_hour
            "#,
        )
        .bind(slot.field_type_id)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(slot.price_per_hour)
        .bind(slot.is_peak_hour)
        .fetch_one(&self.pool)
        .await
    }
}
