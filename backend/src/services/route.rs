//! Picking route suggestion
//!
//! Orders the lines of a picking order into a walking sequence. The heuristic
//! lives behind the `RouteStrategy` trait in the shared crate so a smarter
//! planner can replace the bin/zone sort without touching the state machine.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::picking::PickingService;
use shared::{BinZoneRoute, PickingOrderLine, RouteStrategy};

/// Route service suggesting a walking order for picking lines
#[derive(Clone)]
pub struct RouteService {
    picking: PickingService,
    strategy: Arc<dyn RouteStrategy + Send + Sync>,
}

impl RouteService {
    /// Create a RouteService with the default bin/zone strategy
    pub fn new(db: PgPool) -> Self {
        Self::with_strategy(db, Arc::new(BinZoneRoute))
    }

    /// Create a RouteService with a custom strategy
    pub fn with_strategy(db: PgPool, strategy: Arc<dyn RouteStrategy + Send + Sync>) -> Self {
        Self {
            picking: PickingService::new(db),
            strategy,
        }
    }

    /// Suggest a walking sequence for the lines of an order
    ///
    /// Read-only: the stored line order is left untouched.
    pub async fn suggest_route(
        &self,
        business_id: Uuid,
        order_id: Uuid,
    ) -> AppResult<Vec<PickingOrderLine>> {
        let order = self.picking.get_order(business_id, order_id).await?;
        Ok(self.strategy.sequence(order.lines))
    }
}
