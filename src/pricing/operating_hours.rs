// Operating-hours validation
//
// Wall-clock hours are always read in the configured business timezone,
// never in UTC or the server's local zone.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::bookings::BookingError;

/// Business hours for bookings, expressed in whole local hours
#[derive(Debug, Clone, Copy)]
pub struct OperatingHours {
    open_hour: u32,
    close_hour: u32,
    timezone: Tz,
}

impl OperatingHours {
    pub fn new(open_hour: u32, close_hour: u32, timezone: Tz) -> Self {
        Self {
            open_hour,
            close_hour,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Check that `[start, end)` lies inside business hours
    ///
    /// The start hour is inclusive on both ends (a start at exactly `close:00`
    /// passes here). The end may reach `close:00` but not a second past it.
    pub fn validate(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), BookingError> {
        let local_start = start.with_timezone(&self.timezone);
        let local_end = end.with_timezone(&self.timezone);

        if local_start.hour() < self.open_hour || local_start.hour() > self.close_hour {
            return Err(BookingError::OperatingHours(format!(
                "Bookings must start between {:02}:00 and {:02}:00",
                self.open_hour, self.close_hour
            )));
        }

        if local_end.date_naive() != local_start.date_naive() {
            return Err(BookingError::OperatingHours(format!(
                "Bookings must end on the day they start, no later than {:02}:00",
                self.close_hour
            )));
        }

        let past_close = local_end.hour() > self.close_hour
            || (local_end.hour() == self.close_hour
                && (local_end.minute() > 0 || local_end.second() > 0 || local_end.nanosecond() > 0));

        if past_close {
            return Err(BookingError::OperatingHours(format!(
                "Bookings must end no later than {:02}:00",
                self.close_hour
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Ho_Chi_Minh;

    fn hours() -> OperatingHours {
        OperatingHours::new(7, 22, Ho_Chi_Minh)
    }

    fn local(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Ho_Chi_Minh
            .with_ymd_and_hms(2030, 6, 15, h, m, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_window_inside_hours_passes() {
        assert!(hours().validate(local(17, 30, 0), local(19, 0, 0)).is_ok());
    }

    #[test]
    fn test_start_before_opening_fails() {
        let result = hours().validate(local(5, 0, 0), local(6, 0, 0));
        assert!(matches!(result, Err(BookingError::OperatingHours(_))));
    }

    #[test]
    fn test_start_at_opening_passes() {
        assert!(hours().validate(local(7, 0, 0), local(8, 0, 0)).is_ok());
    }

    #[test]
    fn test_end_exactly_at_closing_passes() {
        assert!(hours().validate(local(21, 0, 0), local(22, 0, 0)).is_ok());
    }

    #[test]
    fn test_end_one_minute_after_closing_fails() {
        let result = hours().validate(local(21, 1, 0), local(22, 1, 0));
        assert!(matches!(result, Err(BookingError::OperatingHours(_))));
    }

    #[test]
    fn test_end_one_second_after_closing_fails() {
        let result = hours().validate(local(21, 0, 1), local(22, 0, 1));
        assert!(matches!(result, Err(BookingError::OperatingHours(_))));
    }

    #[test]
    fn test_start_hour_equal_to_closing_passes_start_check() {
        // The start check alone accepts 22:xx; only the end check can reject it
        let start = local(22, 0, 0);
        let err = hours().validate(start, start + Duration::minutes(30)).unwrap_err();
        assert!(err.to_string().contains("end no later than 22:00"));
    }

    #[test]
    fn test_overnight_window_fails_with_same_day_message() {
        // Ends at 02:00 the next day, whose hour alone is before closing
        let err = hours()
            .validate(local(21, 0, 0), local(21, 0, 0) + Duration::hours(5))
            .unwrap_err();
        assert!(matches!(err, BookingError::OperatingHours(_)));
        assert!(err.to_string().contains("on the day they start"));
    }

    #[test]
    fn test_same_day_late_end_keeps_closing_message() {
        let err = hours().validate(local(21, 0, 0), local(22, 30, 0)).unwrap_err();
        assert!(err.to_string().contains("end no later than 22:00"));
        assert!(!err.to_string().contains("on the day they start"));
    }

    #[test]
    fn test_hours_are_read_in_business_timezone() {
        // 01:00 UTC is 08:00 in Ho Chi Minh City (UTC+7)
        let start = Utc.with_ymd_and_hms(2030, 6, 15, 1, 0, 0).unwrap();
        assert!(hours().validate(start, start + Duration::hours(1)).is_ok());

        // 23:00 UTC is 06:00 the next morning locally, before opening
        let start = Utc.with_ymd_and_hms(2030, 6, 15, 23, 0, 0).unwrap();
        assert!(hours().validate(start, start + Duration::hours(1)).is_err());
    }
}
