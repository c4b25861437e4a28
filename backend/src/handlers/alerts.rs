//! HTTP handlers for the expiring-stock alert feed

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::alerts::{ExpiringLotAlert, ExpiryAlertService};
use crate::AppState;

/// Query parameters for the expiring-stock feed
#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

/// Lots expiring within the lookahead window, across all locations
pub async fn get_expiring_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<ExpiringLotAlert>>> {
    let days = query
        .days
        .unwrap_or(state.config.fulfillment.alert_lookahead_days);
    let service = ExpiryAlertService::new(state.db);
    let alerts = service
        .expiring_lots(current_user.0.business_id, days)
        .await?;
    Ok(Json(alerts))
}
