//! Expiring-stock alerts
//!
//! Cross-location reporting over the lot table: every batch on hand whose
//! expiry falls inside the lookahead window, soonest first, with an urgency
//! band for the notification and dashboard consumers. Read-only; the picking
//! state machine is never involved.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock_lot::{StockLotRow, LOT_COLUMNS};
use shared::{classify_expiry, expiry_urgency, validate_lookahead_days, ExpiryUrgency, StockLot};

/// Expiry alert service
#[derive(Clone)]
pub struct ExpiryAlertService {
    db: PgPool,
}

/// One expiring (or already expired) batch
#[derive(Debug, Serialize)]
pub struct ExpiringLotAlert {
    pub lot_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub lot_number: String,
    pub bin_location: String,
    pub bin_zone: String,
    pub expiry_date: chrono::NaiveDate,
    pub quantity: Decimal,
    pub available_quantity: Decimal,
    pub days_until_expiry: i64,
    pub urgency: ExpiryUrgency,
}

impl ExpiryAlertService {
    /// Create a new ExpiryAlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All lots with stock on hand expiring within the lookahead window
    ///
    /// Spans every location of the business. Already-expired lots are
    /// included with negative days so they surface at the top of the feed.
    pub async fn expiring_lots(
        &self,
        business_id: Uuid,
        lookahead_days: i64,
    ) -> AppResult<Vec<ExpiringLotAlert>> {
        if let Err(msg) = validate_lookahead_days(lookahead_days) {
            return Err(AppError::Validation {
                field: "days".to_string(),
                message: msg.to_string(),
                message_th: "จำนวนวันล่วงหน้าไม่ถูกต้อง".to_string(),
            });
        }

        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM stock_lots
            WHERE business_id = $1
              AND quantity > 0
              AND expiry_date IS NOT NULL
              AND expiry_date <= CURRENT_DATE + $2::INT
            ORDER BY expiry_date ASC, lot_number ASC
            "#
        ))
        .bind(business_id)
        .bind(lookahead_days as i32)
        .fetch_all(&self.db)
        .await?;

        let today = Utc::now().date_naive();

        let alerts = rows
            .into_iter()
            .map(StockLot::from)
            .filter_map(|lot| {
                let check = classify_expiry(lot.expiry_date, today, lookahead_days);
                let days = check.days_until_expiry?;
                Some(ExpiringLotAlert {
                    lot_id: lot.id,
                    item_id: lot.item_id,
                    location_id: lot.location_id,
                    lot_number: lot.lot_number,
                    bin_location: lot.bin_location,
                    bin_zone: lot.bin_zone,
                    // expiry_date is non-null by the query filter
                    expiry_date: lot.expiry_date?,
                    quantity: lot.quantity,
                    available_quantity: lot.quantity - lot.reserved_quantity,
                    days_until_expiry: days,
                    urgency: expiry_urgency(days),
                })
            })
            .collect();

        Ok(alerts)
    }
}
