// Background task that releases windows held by unconfirmed bookings

use chrono::Duration;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info, info_span, Instrument};

use crate::pricing::{Clock, ReservationStore};

/// Configuration for the pending-booking expiry task
#[derive(Debug, Clone, Copy)]
pub struct ExpiryConfig {
    /// How long a pending booking may hold its window
    pub hold: Duration,

    /// Interval between sweeps
    pub interval: std::time::Duration,
}

/// Cancel every pending booking older than the hold time
pub async fn expire_stale_bookings(
    reservations: &dyn ReservationStore,
    clock: &dyn Clock,
    hold: Duration,
) -> Result<u64, sqlx::Error> {
    let deadline = clock.now() - hold;
    let expired = reservations.expire_pending(deadline).await?;
    if expired > 0 {
        info!("Expired {} pending bookings created before {}", expired, deadline);
    }
    Ok(expired)
}

pub fn spawn_expiry_worker(
    reservations: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    config: ExpiryConfig,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            info!(
                "Starting pending booking expiry (hold {} min, every {:?})",
                config.hold.num_minutes(),
                config.interval
            );
            let mut ticker = interval(config.interval);
            loop {
                ticker.tick().await;
                if let Err(e) =
                    expire_stale_bookings(reservations.as_ref(), clock.as_ref(), config.hold).await
                {
                    error!("Pending booking expiry failed: {:?}", e);
                }
            }
        }
        .instrument(info_span!("booking_expiry")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::{Booking, BookingStatus};
    use crate::test_support::{local, FixedClock, MemoryReservationStore};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn booking(status: BookingStatus, created_at: chrono::DateTime<chrono::Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            field_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: local(2030, 6, 20, 10, 0),
            end_time: local(2030, 6, 20, 11, 0),
            total_price: dec!(100000),
            status,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_only_stale_pending_bookings_expire() {
        let store = MemoryReservationStore::default();
        let stale = booking(BookingStatus::Pending, local(2030, 6, 15, 7, 30));
        let fresh = booking(BookingStatus::Pending, local(2030, 6, 15, 7, 50));
        let confirmed = booking(BookingStatus::Confirmed, local(2030, 6, 15, 7, 0));
        store.insert_raw(stale.clone()).await;
        store.insert_raw(fresh.clone()).await;
        store.insert_raw(confirmed.clone()).await;

        let clock = FixedClock(local(2030, 6, 15, 8, 0));
        let expired = expire_stale_bookings(&store, &clock, Duration::minutes(15))
            .await
            .unwrap();

        assert_eq!(expired, 1);
        let statuses: Vec<(Uuid, BookingStatus)> =
            store.all().await.into_iter().map(|b| (b.id, b.status)).collect();
        assert!(statuses.contains(&(stale.id, BookingStatus::Cancelled)));
        assert!(statuses.contains(&(fresh.id, BookingStatus::Pending)));
        assert!(statuses.contains(&(confirmed.id, BookingStatus::Confirmed)));
    }
}
