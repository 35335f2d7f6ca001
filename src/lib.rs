// Field booking API
//
// Availability and pricing engine for sports field bookings, exposed over HTTP.

pub mod auth;
pub mod bookings;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod pricing;

#[cfg(test)]
mod test_support;

use axum::{
    extract::FromRef,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::bookings::BookingService;
use crate::pricing::{AvailabilityEngine, FieldStore, TierStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AvailabilityEngine>,
    pub booking_service: BookingService,
    pub fields: Arc<dyn FieldStore>,
    pub tiers: Arc<dyn TierStore>,
    pub token_service: Arc<TokenService>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.token_service.clone()
    }
}

/// Handler for GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        // Bookings
        .route("/api/bookings/check-price", post(bookings::check_price_handler))
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route("/api/bookings/:id", get(bookings::get_booking_handler))
        .route(
            "/api/bookings/:id/status",
            patch(bookings::update_booking_status_handler),
        )
        // Catalog
        .route("/api/fields/:id", get(fields::get_field_handler))
        .route(
            "/api/field-types/:id/time-slots",
            get(fields::list_time_slots_handler).post(fields::create_time_slot_handler),
        )
        // Operations
        .route("/api/admin/engine-metrics", get(bookings::engine_metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
