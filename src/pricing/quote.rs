// Quote response shapes and the human-readable formatting they use

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const CURRENCY: &str = "VND";

/// Successful answer to a price and availability check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuote {
    pub available: bool,
    pub field_name: String,
    pub booking_details: BookingDetails,
    pub pricing: QuotePricing,
    pub message: String,
}

/// Requested window in the business timezone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    /// `dd/mm/yyyy`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    /// e.g. `1h30m`
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotePricing {
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_hour: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub currency: String,
}

impl BookingDetails {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, duration_minutes: i64, timezone: Tz) -> Self {
        let local_start = start.with_timezone(&timezone);
        let local_end = end.with_timezone(&timezone);
        Self {
            date: local_start.format("%d/%m/%Y").to_string(),
            start_time: local_start.format("%H:%M").to_string(),
            end_time: local_end.format("%H:%M").to_string(),
            duration: duration_label(duration_minutes),
        }
    }
}

/// `90` → `1h30m`, `120` → `2h`, `45` → `45m`
pub fn duration_label(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h{:02}m", h, m),
    }
}

/// Conflict message naming the occupied window in local time
pub fn conflict_message(start: DateTime<Utc>, end: DateTime<Utc>, timezone: Tz) -> String {
    let local_start = start.with_timezone(&timezone);
    let local_end = end.with_timezone(&timezone);
    format!(
        "Field is already booked from {} to {} on {}",
        local_start.format("%H:%M"),
        local_end.format("%H:%M"),
        local_start.format("%d/%m/%Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Ho_Chi_Minh;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duration_labels() {
        assert_eq!(duration_label(30), "30m");
        assert_eq!(duration_label(90), "1h30m");
        assert_eq!(duration_label(120), "2h");
        assert_eq!(duration_label(305), "5h05m");
    }

    #[test]
    fn test_details_use_local_time() {
        // 10:30 UTC is 17:30 in Ho Chi Minh City
        let start = Utc.with_ymd_and_hms(2030, 6, 15, 10, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap();
        let details = BookingDetails::new(start, end, 90, Ho_Chi_Minh);

        assert_eq!(details.date, "15/06/2030");
        assert_eq!(details.start_time, "17:30");
        assert_eq!(details.end_time, "19:00");
        assert_eq!(details.duration, "1h30m");
    }

    #[test]
    fn test_conflict_message_names_window() {
        let start = Utc.with_ymd_and_hms(2030, 6, 15, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 6, 15, 11, 30, 0).unwrap();
        assert_eq!(
            conflict_message(start, end, Ho_Chi_Minh),
            "Field is already booked from 17:00 to 18:30 on 15/06/2030"
        );
    }

    #[test]
    fn test_pricing_serializes_numbers() {
        let pricing = QuotePricing {
            price_per_hour: dec!(300000),
            total_price: dec!(450000),
            currency: CURRENCY.to_string(),
        };
        let json = serde_json::to_value(&pricing).unwrap();
        assert_eq!(json["total_price"].as_f64(), Some(450000.0));
        assert_eq!(json["currency"], "VND");
    }
}
