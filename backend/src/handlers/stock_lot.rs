//! HTTP handlers for stock lot queries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::StockLotService;
use crate::AppState;
use shared::StockLot;

/// Query parameters for listing lots
#[derive(Debug, Deserialize)]
pub struct ListLotsQuery {
    pub location_id: Uuid,
    pub item_id: Option<Uuid>,
}

/// List lots with stock on hand, for a location or an (item, location) pair
pub async fn list_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListLotsQuery>,
) -> AppResult<Json<Vec<StockLot>>> {
    let service = StockLotService::new(state.db);
    let lots = match query.item_id {
        Some(item_id) => {
            service
                .get_available_lots(current_user.0.business_id, item_id, query.location_id)
                .await?
        }
        None => {
            service
                .list_lots(current_user.0.business_id, query.location_id)
                .await?
        }
    };
    Ok(Json(lots))
}

/// Look up a lot by its batch number within a location
pub async fn get_lot_by_number(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((location_id, lot_number)): Path<(Uuid, String)>,
) -> AppResult<Json<StockLot>> {
    let service = StockLotService::new(state.db);
    let lot = service
        .get_by_lot_number(current_user.0.business_id, location_id, &lot_number)
        .await?;
    Ok(Json(lot))
}

/// Get a single lot by ID
pub async fn get_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<StockLot>> {
    let service = StockLotService::new(state.db);
    let lot = service.get_lot(current_user.0.business_id, lot_id).await?;
    Ok(Json(lot))
}
