use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Shortest bookable window, in minutes
pub const MIN_DURATION_MINUTES: i64 = 30;

/// Longest bookable window, in minutes
pub const MAX_DURATION_MINUTES: i64 = 300;

/// Booking status enum representing the lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    CheckedIn,
    Finished,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Finished => "finished",
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "finished" => Ok(BookingStatus::Finished),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// A claimed window on a field
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub field_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values needed to insert a booking
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub field_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: BookingStatus,
}

/// Result of an atomic check-and-insert
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Created(Booking),
    /// Another non-cancelled booking holds an overlapping window. The row is
    /// `None` when the storage constraint fired without telling us which one.
    Conflict(Option<Booking>),
}

/// Result of a compare-and-set status write
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Updated(Booking),
    /// The booking is gone or no longer holds the expected status
    Stale,
    /// The new status would make the booking overlap a live one
    Conflict,
}

/// Request DTO for the price check and for booking creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckPriceRequest {
    pub field_id: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(alias = "duration_minutes")]
    #[validate(range(min = 30, max = 300, message = "Duration must be between 30 and 300 minutes"))]
    pub duration: i64,
}

/// Request DTO for updating booking status
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}
