use std::sync::Arc;

use field_booking_api::auth::TokenService;
use field_booking_api::bookings::{spawn_expiry_worker, BookingService, ExpiryConfig, PgReservationStore};
use field_booking_api::config::AppConfig;
use field_booking_api::fields::{PgFieldStore, PgTierStore};
use field_booking_api::pricing::{
    AvailabilityEngine, CachedTierStore, Clock, EngineMetrics, FieldStore, ReservationStore,
    SystemClock, TierStore,
};
use field_booking_api::{create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Field Booking API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");
    tracing::info!(
        "Business hours {:02}:00-{:02}:00 ({})",
        config.open_hour,
        config.close_hour,
        config.timezone
    );

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let metrics = EngineMetrics::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let fields: Arc<dyn FieldStore> = Arc::new(PgFieldStore::new(db_pool.clone()));
    let tiers: Arc<dyn TierStore> = Arc::new(CachedTierStore::new(
        Arc::new(PgTierStore::new(db_pool.clone())),
        config.tier_cache_ttl,
        metrics.clone(),
    ));
    let reservations: Arc<dyn ReservationStore> =
        Arc::new(PgReservationStore::new(db_pool.clone()));

    let engine = Arc::new(AvailabilityEngine::new(
        fields.clone(),
        tiers.clone(),
        reservations.clone(),
        config.operating_hours(),
        config.pricing_policy(),
        clock.clone(),
        metrics.clone(),
    ));

    spawn_expiry_worker(
        reservations.clone(),
        clock,
        ExpiryConfig {
            hold: chrono::Duration::seconds(config.booking_hold.as_secs() as i64),
            interval: config.expiry_interval,
        },
    );

    let state = AppState {
        booking_service: BookingService::new(engine.clone(), reservations),
        engine,
        fields,
        tiers,
        token_service: Arc::new(TokenService::new(config.jwt_secret.clone())),
    };

    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Field Booking API is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    metrics.log_summary();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
