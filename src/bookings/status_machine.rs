use crate::bookings::BookingStatus;

/// Booking lifecycle rules
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Cancelled
    /// - Confirmed → CheckedIn, Completed, Cancelled
    /// - CheckedIn → Finished, Completed
    /// - Completed → Finished
    /// - Cancelled, Finished → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::CheckedIn)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::CheckedIn, BookingStatus::Finished)
                | (BookingStatus::CheckedIn, BookingStatus::Completed)
                | (BookingStatus::Completed, BookingStatus::Finished)
        )
    }

    /// Attempt to transition from one status to another
    pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}
