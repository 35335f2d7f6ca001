// Price Resolver
//
// Maps a requested start time to an hourly rate through the field type's time
// slots, then charges for the requested duration rounded up to the pricing unit.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::fields::TimeSlot;
use crate::pricing::metrics::EngineMetrics;
use crate::pricing::ports::TierStore;

/// System-wide pricing constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Rate used when no time slot covers the requested start
    pub default_price_per_hour: Decimal,
    /// Totals are rounded up to a multiple of this amount
    pub rounding_unit: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            default_price_per_hour: Decimal::from(100_000),
            rounding_unit: Decimal::from(1_000),
        }
    }
}

/// Outcome of a price lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub price_per_hour: Decimal,
    pub total_price: Decimal,
    /// Slot that supplied the rate, `None` when the default rate applied
    pub tier: Option<TimeSlot>,
}

/// Charge for `duration_minutes` at `price_per_hour`, rounded up to `rounding_unit`
///
/// Multiplies before dividing so whole-unit totals stay exact.
pub fn compute_total(price_per_hour: Decimal, duration_minutes: i64, rounding_unit: Decimal) -> Decimal {
    let raw = price_per_hour * Decimal::from(duration_minutes) / Decimal::from(60);
    (raw / rounding_unit).ceil() * rounding_unit
}

pub struct PriceResolver {
    tiers: Arc<dyn TierStore>,
    policy: PricingPolicy,
    timezone: Tz,
    metrics: EngineMetrics,
}

impl PriceResolver {
    pub fn new(tiers: Arc<dyn TierStore>, policy: PricingPolicy, timezone: Tz, metrics: EngineMetrics) -> Self {
        Self {
            tiers,
            policy,
            timezone,
            metrics,
        }
    }

    pub async fn resolve(
        &self,
        field_type_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<PriceBreakdown, sqlx::Error> {
        let time_of_day = start.with_timezone(&self.timezone).time();

        let tier = self
            .tiers
            .find_matching_tier(field_type_id, time_of_day)
            .await?;

        let price_per_hour = match &tier {
            Some(slot) => slot.price_per_hour,
            None => {
                self.metrics.record_default_rate_fallback();
                tracing::warn!(
                    "No time slot of field type {} covers {}; charging default rate {}",
                    field_type_id,
                    time_of_day.format("%H:%M"),
                    self.policy.default_price_per_hour
                );
                self.policy.default_price_per_hour
            }
        };

        let total_price = compute_total(price_per_hour, duration_minutes, self.policy.rounding_unit);

        Ok(PriceBreakdown {
            price_per_hour,
            total_price,
            tier,
        })
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Totals are always a multiple of the rounding unit and never below the raw charge
        #[test]
        fn prop_total_is_rounded_upward(price in 1_000u32..=2_000_000u32, minutes in 30i64..=300) {
            let price = Decimal::from(price);
            let unit = Decimal::from(1_000);
            let raw = price * Decimal::from(minutes) / Decimal::from(60);
            let total = compute_total(price, minutes, unit);

            prop_assert!(total >= raw);
            prop_assert_eq!(total % unit, Decimal::ZERO);
            prop_assert!(total - raw < unit);
            if raw % unit != Decimal::ZERO {
                prop_assert!(total > raw);
            }
        }

        /// Longer bookings never cost less at the same rate
        #[test]
        fn prop_total_is_monotonic_in_duration(price in 1_000u32..=2_000_000u32, minutes in 30i64..300) {
            let price = Decimal::from(price);
            let unit = Decimal::from(1_000);
            prop_assert!(compute_total(price, minutes + 1, unit) >= compute_total(price, minutes, unit));
        }
    }
}
