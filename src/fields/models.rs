use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A bookable sports field
///
/// `status` is the active flag: inactive fields cannot be quoted or booked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    pub status: bool,
    pub field_type_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Field {
    pub fn is_active(&self) -> bool {
        self.status
    }
}

/// Pricing category shared by several fields (e.g. "5-a-side", "7-a-side")
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FieldType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Hourly price band for a field type, in local wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TimeSlot {
    pub id: Uuid,
    pub field_type_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_hour: Decimal,
    pub is_peak_hour: bool,
}

impl TimeSlot {
    /// Start-inclusive, end-exclusive: a slot ending at 19:00 does not cover 19:00
    pub fn covers(&self, time_of_day: NaiveTime) -> bool {
        self.start_time <= time_of_day && time_of_day < self.end_time
    }
}

/// Request DTO for creating a time slot
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_slot_bounds"))]
pub struct CreateTimeSlotRequest {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_hour: Decimal,
    #[serde(default)]
    pub is_peak_hour: bool,
}

fn validate_slot_bounds(request: &CreateTimeSlotRequest) -> Result<(), ValidationError> {
    if request.start_time >= request.end_time {
        let mut error = ValidationError::new("time_range");
        error.message = Some("start_time must be before end_time".into());
        return Err(error);
    }
    if request.price_per_hour <= Decimal::ZERO {
        let mut error = ValidationError::new("price_per_hour");
        error.message = Some("price_per_hour must be positive".into());
        return Err(error);
    }
    Ok(())
}

/// Values needed to insert a time slot
#[derive(Debug, Clone)]
pub struct NewTimeSlot {
    pub field_type_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price_per_hour: Decimal,
    pub is_peak_hour: bool,
}

impl NewTimeSlot {
    pub fn from_request(field_type_id: Uuid, request: CreateTimeSlotRequest) -> Self {
        Self {
            field_type_id,
            start_time: request.start_time,
            end_time: request.end_time,
            price_per_hour: request.price_per_hour,
            is_peak_hour: request.is_peak_hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot {
            id: Uuid::new_v4(),
            field_type_id: Uuid::new_v4(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            price_per_hour: dec!(300000),
            is_peak_hour: true,
        }
    }

    #[test]
    fn test_slot_covers_start_boundary() {
        let peak = slot((17, 0), (19, 0));
        assert!(peak.covers(NaiveTime::from_hms_opt(17, 0, 0).unwrap()));
    }

    #[test]
    fn test_slot_excludes_end_boundary() {
        let peak = slot((17, 0), (19, 0));
        assert!(!peak.covers(NaiveTime::from_hms_opt(19, 0, 0).unwrap()));
        assert!(peak.covers(NaiveTime::from_hms_opt(18, 59, 59).unwrap()));
    }

    #[test]
    fn test_create_request_rejects_inverted_range() {
        let request = CreateTimeSlotRequest {
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            price_per_hour: dec!(200000),
            is_peak_hour: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_zero_price() {
        let request = CreateTimeSlotRequest {
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            price_per_hour: Decimal::ZERO,
            is_peak_hour: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_time_slot_price_serializes_as_number() {
        let json = serde_json::to_value(slot((6, 0), (17, 0))).unwrap();
        assert_eq!(json["price_per_hour"], serde_json::json!(300000.0));
        assert_eq!(json["start_time"], "06:00:00");
    }
}
