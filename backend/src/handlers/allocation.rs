//! HTTP handlers for allocation planning and reservations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::allocation::{AllocationService, ReservationReceipt};
use crate::AppState;
use shared::{AllocationPlan, LotReservation, LotReservationLine};

/// Request body for planning or reserving an allocation
#[derive(Debug, Deserialize)]
pub struct AllocationRequest {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub required_quantity: Decimal,
}

/// Build a fulfillment plan without reserving anything
pub async fn plan_allocation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AllocationRequest>,
) -> AppResult<Json<AllocationPlan>> {
    let service = AllocationService::new(state.db);
    let plan = service
        .plan(
            current_user.0.business_id,
            input.item_id,
            input.location_id,
            input.required_quantity,
            state.config.fulfillment.expiry_warning_days,
        )
        .await?;
    Ok(Json(plan))
}

/// Plan and atomically reserve the suggested lots
pub async fn reserve_allocation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AllocationRequest>,
) -> AppResult<Json<ReservationReceipt>> {
    let service = AllocationService::new(state.db);
    let receipt = service
        .reserve(
            current_user.0.business_id,
            input.item_id,
            input.location_id,
            input.required_quantity,
            state.config.fulfillment.expiry_warning_days,
        )
        .await?;
    Ok(Json(receipt))
}

/// Get a reservation with its lines
pub async fn get_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(reservation_id): Path<Uuid>,
) -> AppResult<Json<ReservationResponse>> {
    let service = AllocationService::new(state.db);
    let (reservation, lines) = service
        .get_reservation(current_user.0.business_id, reservation_id)
        .await?;
    Ok(Json(ReservationResponse { reservation, lines }))
}

/// Consume reserved stock on pick confirmation
pub async fn commit_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(reservation_id): Path<Uuid>,
) -> AppResult<Json<LotReservation>> {
    let service = AllocationService::new(state.db);
    let reservation = service
        .commit(current_user.0.business_id, reservation_id)
        .await?;
    Ok(Json(reservation))
}

/// Return reserved stock to availability
pub async fn release_reservation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(reservation_id): Path<Uuid>,
) -> AppResult<Json<LotReservation>> {
    let service = AllocationService::new(state.db);
    let reservation = service
        .release(current_user.0.business_id, reservation_id)
        .await?;
    Ok(Json(reservation))
}

/// Query parameters for releasing stale reservations
#[derive(Debug, Deserialize)]
pub struct ReleaseStaleQuery {
    pub older_than_minutes: Option<i64>,
}

/// Release abandoned reservations past the TTL
pub async fn release_stale_reservations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReleaseStaleQuery>,
) -> AppResult<Json<ReleaseStaleResponse>> {
    let ttl = query
        .older_than_minutes
        .unwrap_or(state.config.fulfillment.reservation_ttl_minutes);
    let service = AllocationService::new(state.db);
    let released = service
        .release_stale(current_user.0.business_id, ttl)
        .await?;
    Ok(Json(ReleaseStaleResponse { released }))
}

/// Response for a reservation lookup
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    #[serde(flatten)]
    pub reservation: LotReservation,
    pub lines: Vec<LotReservationLine>,
}

/// Response for a stale-release sweep
#[derive(Debug, Serialize)]
pub struct ReleaseStaleResponse {
    pub released: u64,
}
