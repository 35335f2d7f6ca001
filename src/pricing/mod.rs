// Availability & Pricing Engine
//
// Decides whether a field can be booked for a window and what it costs:
// - Operating hours: the window must sit inside business hours
// - Field status: the field must exist and be active
// - Overlap: no non-cancelled booking may intersect the window
// - Price: hourly rate from the field type's time slots, rounded up
//
// The engine only reads. Booking creation re-runs it and then commits through
// the reservation store's atomic insert.

pub mod metrics;
pub mod operating_hours;
pub mod overlap;
pub mod ports;
pub mod price_resolver;
pub mod quote;
pub mod tier_cache;

pub use metrics::{EngineMetrics, MetricsSummary};
pub use operating_hours::OperatingHours;
pub use overlap::{intervals_overlap, OverlapChecker, NON_BLOCKING_STATUSES};
pub use ports::{Clock, FieldStore, ReservationStore, SystemClock, TierStore};
pub use price_resolver::{compute_total, PriceBreakdown, PriceResolver, PricingPolicy};
pub use quote::{AvailabilityQuote, BookingDetails, QuotePricing, CURRENCY};
pub use tier_cache::CachedTierStore;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use uuid::Uuid;

use crate::bookings::{Booking, BookingError, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::fields::Field;

/// Everything the engine established about an accepted request
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub field: Field,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
    pub price: PriceBreakdown,
}

/// Availability Engine
///
/// Sequences the checks in a fixed order and stops at the first failure.
pub struct AvailabilityEngine {
    fields: Arc<dyn FieldStore>,
    overlap_checker: OverlapChecker,
    price_resolver: PriceResolver,
    operating_hours: OperatingHours,
    clock: Arc<dyn Clock>,
    metrics: EngineMetrics,
}

impl AvailabilityEngine {
    pub fn new(
        fields: Arc<dyn FieldStore>,
        tiers: Arc<dyn TierStore>,
        reservations: Arc<dyn ReservationStore>,
        operating_hours: OperatingHours,
        policy: PricingPolicy,
        clock: Arc<dyn Clock>,
        metrics: EngineMetrics,
    ) -> Self {
        Self {
            fields,
            overlap_checker: OverlapChecker::new(reservations),
            price_resolver: PriceResolver::new(tiers, policy, operating_hours.timezone(), metrics.clone()),
            operating_hours,
            clock,
            metrics,
        }
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn timezone(&self) -> Tz {
        self.operating_hours.timezone()
    }

    /// Check availability and price for `duration_minutes` starting at `start`
    pub async fn check_availability_and_price(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<AvailabilityQuote, BookingError> {
        let evaluation = self.evaluate(field_id, start, duration_minutes).await?;
        Ok(self.to_quote(&evaluation))
    }

    /// Run every check and keep the raw results for callers that persist them
    pub async fn evaluate(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Evaluation, BookingError> {
        let _timer = self.metrics.start_quote();

        let result = self.run_checks(field_id, start, duration_minutes).await;
        match &result {
            Ok(_) | Err(BookingError::DatabaseError(_)) => {}
            Err(BookingError::SchedulingConflict(_)) => self.metrics.record_conflict(),
            Err(_) => self.metrics.record_rejection(),
        }
        result
    }

    async fn run_checks(
        &self,
        field_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Evaluation, BookingError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(BookingError::InvalidRequest(format!(
                "Duration must be between {} and {} minutes",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }

        // 1. Past start
        if start < self.clock.now() {
            return Err(BookingError::InvalidRequest(
                "Cannot book a time in the past".to_string(),
            ));
        }

        // 2. End of the window
        let end = start + Duration::minutes(duration_minutes);

        // 3. Business hours
        self.operating_hours.validate(start, end)?;

        // 4. Field must exist and be active
        let field = self
            .fields
            .find_by_id(field_id)
            .await?
            .ok_or(BookingError::FieldNotFound(field_id))?;

        if !field.is_active() {
            return Err(BookingError::FieldInactive(field_id));
        }

        // 5. Overlap with existing bookings
        if let Some(existing) = self.overlap_checker.find_conflict(field_id, start, end).await? {
            tracing::debug!(
                "Field {} requested {}..{} conflicts with booking {}",
                field_id,
                start,
                end,
                existing.id
            );
            return Err(self.conflict_error(&existing));
        }

        // 6. Price
        let price = self
            .price_resolver
            .resolve(field.field_type_id, start, duration_minutes)
            .await?;

        Ok(Evaluation {
            field,
            start,
            end,
            duration_minutes,
            price,
        })
    }

    /// Conflict error describing `existing`'s window in local time
    pub fn conflict_error(&self, existing: &Booking) -> BookingError {
        BookingError::SchedulingConflict(quote::conflict_message(
            existing.start_time,
            existing.end_time,
            self.timezone(),
        ))
    }

    /// Conflict error for a window whose competing booking is unknown
    pub fn window_conflict_error(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingError {
        BookingError::SchedulingConflict(quote::conflict_message(start, end, self.timezone()))
    }

    fn to_quote(&self, evaluation: &Evaluation) -> AvailabilityQuote {
        AvailabilityQuote {
            available: true,
            field_name: evaluation.field.name.clone(),
            booking_details: BookingDetails::new(
                evaluation.start,
                evaluation.end,
                evaluation.duration_minutes,
                self.timezone(),
            ),
            pricing: QuotePricing {
                price_per_hour: evaluation.price.price_per_hour,
                total_price: evaluation.price.total_price,
                currency: CURRENCY.to_string(),
            },
            message: "Field is available for booking".to_string(),
        }
    }
}
