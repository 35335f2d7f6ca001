// Time slot cache
//
// Keeps each field type's slot list in memory for a short TTL so quotes do not
// hit the database for configuration that changes rarely. Creating a slot
// through this store drops the cached list for its field type.

use async_trait::async_trait;
use chrono::NaiveTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::fields::{NewTimeSlot, TimeSlot};
use crate::pricing::metrics::EngineMetrics;
use crate::pricing::ports::TierStore;

/// Default time-to-live for cached slot lists (60 seconds)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedSlots {
    slots: Vec<TimeSlot>,
    loaded_at: Instant,
}

pub struct CachedTierStore {
    inner: Arc<dyn TierStore>,
    cache: RwLock<HashMap<Uuid, CachedSlots>>,
    ttl: Duration,
    metrics: EngineMetrics,
}

impl CachedTierStore {
    pub fn new(inner: Arc<dyn TierStore>, ttl: Duration, metrics: EngineMetrics) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            ttl,
            metrics,
        }
    }

    /// Drop the cached list for one field type
    pub async fn invalidate(&self, field_type_id: Uuid) {
        self.cache.write().await.remove(&field_type_id);
    }

    async fn slots_for(&self, field_type_id: Uuid) -> Result<Vec<TimeSlot>, sqlx::Error> {
        // Fast path under the read lock
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&field_type_id) {
                if entry.loaded_at.elapsed() <= self.ttl {
                    self.metrics.record_cache_hit();
                    return Ok(entry.slots.clone());
                }
            }
        }

        self.metrics.record_cache_miss();

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(entry) = cache.get(&field_type_id) {
            if entry.loaded_at.elapsed() <= self.ttl {
                return Ok(entry.slots.clone());
            }
        }

        let slots = self.inner.list_for_type(field_type_id).await?;
        tracing::debug!(
            "Loaded {} time slots for field type {} into cache",
            slots.len(),
            field_type_id
        );
        cache.insert(
            field_type_id,
            CachedSlots {
                slots: slots.clone(),
                loaded_at: Instant::now(),
            },
        );

        Ok(slots)
    }
}

#[async_trait]
impl TierStore for CachedTierStore {
    async fn find_matching_tier(
        &self,
        field_type_id: Uuid,
        time_of_day: NaiveTime,
    ) -> Result<Option<TimeSlot>, sqlx::Error> {
        let slots = self.slots_for(field_type_id).await?;
        let mut matching: Vec<TimeSlot> = slots
            .into_iter()
            .filter(|slot| slot.covers(time_of_day))
            .collect();
        // Same tie-break as the SQL lookup when slots overlap
        matching.sort_by_key(|slot| slot.start_time);
        Ok(matching.into_iter().next())
    }

    async fn list_for_type(&self, field_type_id: Uuid) -> Result<Vec<TimeSlot>, sqlx::Error> {
        self.slots_for(field_type_id).await
    }

    async fn create(&self, slot: &NewTimeSlot) -> Result<TimeSlot, sqlx::Error> {
        let created = self.inner.create(slot).await?;
        self.invalidate(slot.field_type_id).await;
        Ok(created)
    }
}
