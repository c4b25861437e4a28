//! Stock lot read access
//!
//! Read side of the lot table: everything the allocation engine and the alert
//! feed need to see, scoped by business. Mutation of reservations lives in
//! the allocation service so the compare-and-swap discipline stays in one
//! place.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::StockLot;

/// Columns selected for every lot query, kept in one place
pub(crate) const LOT_COLUMNS: &str = "id, business_id, item_id, location_id, lot_number, \
     expiry_date, production_date, quantity, reserved_quantity, \
     bin_location, bin_zone, version, created_at, updated_at";

/// Database row for a stock lot
#[derive(Debug, FromRow)]
pub(crate) struct StockLotRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub lot_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub production_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub bin_location: String,
    pub bin_zone: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StockLotRow> for StockLot {
    fn from(row: StockLotRow) -> Self {
        StockLot {
            id: row.id,
            business_id: row.business_id,
            item_id: row.item_id,
            location_id: row.location_id,
            lot_number: row.lot_number,
            expiry_date: row.expiry_date,
            production_date: row.production_date,
            quantity: row.quantity,
            reserved_quantity: row.reserved_quantity,
            bin_location: row.bin_location,
            bin_zone: row.bin_zone,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Stock lot service for querying batches on hand
#[derive(Clone)]
pub struct StockLotService {
    db: PgPool,
}

impl StockLotService {
    /// Create a new StockLotService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all lots with stock on hand for an (item, location) pair
    ///
    /// Rows come back in FEFO order (missing expiry last, missing production
    /// date first); the allocation planner re-sorts with the same rule so the
    /// ordering contract lives in exactly one pure function.
    pub async fn get_available_lots(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
    ) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM stock_lots
            WHERE business_id = $1 AND item_id = $2 AND location_id = $3
              AND quantity > 0
            ORDER BY expiry_date ASC NULLS LAST,
                     production_date ASC NULLS FIRST,
                     lot_number ASC
            "#
        ))
        .bind(business_id)
        .bind(item_id)
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a lot by ID
    pub async fn get_lot(&self, business_id: Uuid, lot_id: Uuid) -> AppResult<StockLot> {
        let row = sqlx::query_as::<_, StockLotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM stock_lots WHERE id = $1 AND business_id = $2"
        ))
        .bind(lot_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock lot".to_string()))?;

        Ok(row.into())
    }

    /// Get a lot by its batch number within a location
    pub async fn get_by_lot_number(
        &self,
        business_id: Uuid,
        location_id: Uuid,
        lot_number: &str,
    ) -> AppResult<StockLot> {
        let row = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM stock_lots
            WHERE business_id = $1 AND location_id = $2 AND lot_number = $3
            "#
        ))
        .bind(business_id)
        .bind(location_id)
        .bind(lot_number)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock lot".to_string()))?;

        Ok(row.into())
    }

    /// List all lots with stock on hand for a location
    pub async fn list_lots(
        &self,
        business_id: Uuid,
        location_id: Uuid,
    ) -> AppResult<Vec<StockLot>> {
        let rows = sqlx::query_as::<_, StockLotRow>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM stock_lots
            WHERE business_id = $1 AND location_id = $2 AND quantity > 0
            ORDER BY bin_zone ASC, bin_location ASC, lot_number ASC
            "#
        ))
        .bind(business_id)
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
