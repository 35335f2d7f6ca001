// HTTP handlers for the field catalog and its price tiers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::fields::{CreateTimeSlotRequest, Field, NewTimeSlot, TimeSlot};
use crate::pricing::{FieldStore, TierStore};
use crate::AppState;

/// Handler for GET /api/fields/:id
pub async fn get_field_handler(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> Result<Json<Field>, ApiError> {
    let field = state
        .fields
        .find_by_id(field_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Field".to_string(),
            id: field_id.to_string(),
        })?;

    Ok(Json(field))
}

/// Handler for GET /api/field-types/:id/time-slots
/// Lists the price tiers of a field type ordered by start time
pub async fn list_time_slots_handler(
    State(state): State<AppState>,
    Path(field_type_id): Path<Uuid>,
) -> Result<Json<Vec<TimeSlot>>, ApiError> {
    ensure_field_type(&state, field_type_id).await?;

    let slots = state.tiers.list_for_type(field_type_id).await?;
    Ok(Json(slots))
}

/// Handler for POST /api/field-types/:id/time-slots
/// Adds a price tier (admin only)
pub async fn create_time_slot_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(field_type_id): Path<Uuid>,
    Json(request): Json<CreateTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), ApiError> {
    request.validate()?;
    ensure_field_type(&state, field_type_id).await?;

    let slot = state
        .tiers
        .create(&NewTimeSlot::from_request(field_type_id, request))
        .await?;

    info!(
        "Admin {} added time slot {} ({}-{}) to field type {}",
        admin.0.user_id,
        slot.id,
        slot.start_time.format("%H:%M"),
        slot.end_time.format("%H:%M"),
        field_type_id
    );

    Ok((StatusCode::CREATED, Json(slot)))
}

async fn ensure_field_type(state: &AppState, field_type_id: Uuid) -> Result<(), ApiError> {
    state
        .fields
        .find_field_type(field_type_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound {
            resource: "Field type".to_string(),
            id: field_type_id.to_string(),
        })
}
