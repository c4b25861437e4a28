//! Stock lot models
//!
//! A stock lot is a quantity-tracked batch of one item in one location,
//! sharing a lot number, production date and expiry date. Lots are created by
//! goods receipt (outside this core) and consumed by reservation and picking.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical stock batch for one (item, location) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLot {
    pub id: Uuid,
    pub business_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    /// Batch identity assigned at goods receipt (e.g., "LOT-2026-0042")
    pub lot_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub production_date: Option<NaiveDate>,
    /// On-hand quantity
    pub quantity: Decimal,
    /// Quantity earmarked for open reservations; never exceeds `quantity`
    pub reserved_quantity: Decimal,
    pub bin_location: String,
    pub bin_zone: String,
    /// Optimistic lock counter, bumped on every reservation change
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockLot {
    /// Quantity still free to allocate
    pub fn available_quantity(&self) -> Decimal {
        self.quantity - self.reserved_quantity
    }
}

/// A persisted reservation token returned by the allocation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotReservation {
    pub id: Uuid,
    pub business_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-lot quantity held by a reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotReservationLine {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub lot_id: Uuid,
    pub lot_number: String,
    pub quantity: Decimal,
}

/// Lifecycle of a reservation token
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Holding stock; counted in `reserved_quantity`
    Active,
    /// Stock consumed on pick confirmation
    Committed,
    /// Hold returned to available stock
    Released,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Committed => "committed",
            ReservationStatus::Released => "released",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ReservationStatus::Active),
            "committed" => Some(ReservationStatus::Committed),
            "released" => Some(ReservationStatus::Released),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
