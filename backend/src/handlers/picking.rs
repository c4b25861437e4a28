//! HTTP handlers for picking order management

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::picking::{
    AssignPickerInput, CreatePickingOrderInput, PickingOrderWithLines, PickingService,
    UpdateLineInput,
};
use crate::services::RouteService;
use crate::AppState;
use shared::{Pagination, PickingOrder, PickingOrderLine, PickingOrderStatus};

/// Create a picking order from an outbound document
pub async fn create_picking_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePickingOrderInput>,
) -> AppResult<Json<PickingOrderWithLines>> {
    let service = PickingService::new(state.db);
    let order = service
        .create_order(current_user.0.business_id, input)
        .await?;
    Ok(Json(order))
}

/// Query parameters for listing picking orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List picking orders, optionally filtered by status
pub async fn list_picking_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<Vec<PickingOrder>>> {
    let status = match query.status.as_deref() {
        Some(s) => Some(PickingOrderStatus::parse(s).ok_or_else(|| AppError::Validation {
            field: "status".to_string(),
            message: format!("Unknown status: {}", s),
            message_th: format!("ไม่รู้จักสถานะ: {}", s),
        })?),
        None => None,
    };

    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page).max(1),
        per_page: query.per_page.unwrap_or(defaults.per_page).clamp(1, 200),
    };

    let service = PickingService::new(state.db);
    let orders = service
        .list_orders(current_user.0.business_id, status, &pagination)
        .await?;
    Ok(Json(orders))
}

/// Get a picking order with its lines
pub async fn get_picking_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PickingOrderWithLines>> {
    let service = PickingService::new(state.db);
    let order = service
        .get_order(current_user.0.business_id, order_id)
        .await?;
    Ok(Json(order))
}

/// Assign or clear the picker on an order
pub async fn assign_picker(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<AssignPickerInput>,
) -> AppResult<Json<PickingOrder>> {
    let service = PickingService::new(state.db);
    let order = service
        .assign_picker(current_user.0.business_id, order_id, input.picker_id)
        .await?;
    Ok(Json(order))
}

/// Confirm a picked line
pub async fn update_picking_line(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((order_id, line_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateLineInput>,
) -> AppResult<Json<PickingOrderLine>> {
    let service = PickingService::new(state.db);
    let line = service
        .update_line(current_user.0.business_id, order_id, line_id, input)
        .await?;
    Ok(Json(line))
}

/// Complete a picking order (all-or-nothing gate)
pub async fn complete_picking_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PickingOrder>> {
    let service = PickingService::new(state.db);
    let order = service
        .complete(current_user.0.business_id, order_id)
        .await?;
    Ok(Json(order))
}

/// Cancel a picking order
pub async fn cancel_picking_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PickingOrder>> {
    let service = PickingService::new(state.db);
    let order = service
        .cancel(current_user.0.business_id, order_id)
        .await?;
    Ok(Json(order))
}

/// Suggest a walking sequence for the lines of an order
pub async fn get_picking_route(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<PickingOrderLine>>> {
    let service = RouteService::new(state.db);
    let route = service
        .suggest_route(current_user.0.business_id, order_id)
        .await?;
    Ok(Json(route))
}

/// Query parameters for the stale-order feed
#[derive(Debug, Deserialize)]
pub struct StaleOrdersQuery {
    pub idle_hours: Option<i64>,
}

/// List orders idle beyond the staleness window
pub async fn list_stale_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StaleOrdersQuery>,
) -> AppResult<Json<Vec<PickingOrder>>> {
    let idle_hours = query
        .idle_hours
        .unwrap_or(state.config.fulfillment.stale_order_hours);
    let service = PickingService::new(state.db);
    let orders = service
        .list_stale_orders(current_user.0.business_id, idle_hours)
        .await?;
    Ok(Json(orders))
}
