//! Lot allocation planning
//!
//! FEFO ordering and the greedy fulfillment walk. `build_allocation_plan` is
//! the whole allocation engine in pure form: given the lots on hand it
//! decides which batches satisfy a requested quantity, soonest expiry first,
//! without touching any stored reservation. The backend service only fetches
//! rows and hands them to this function, which keeps the algorithm
//! deterministic and testable.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::expiry::{classify_expiry, ExpiryStatus};
use crate::models::lot::StockLot;

/// A lot annotated with its expiry classification and availability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatedLot {
    pub lot: StockLot,
    pub status: ExpiryStatus,
    pub days_until_expiry: Option<i64>,
    pub available_quantity: Decimal,
}

/// One step of the suggested pick: take `pick_quantity` from `lot_number`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotPick {
    pub lot_id: uuid::Uuid,
    pub lot_number: String,
    pub bin_location: String,
    pub bin_zone: String,
    pub pick_quantity: Decimal,
}

/// Transient allocation result; never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// All candidate lots in FEFO order, annotated
    pub lots: Vec<AllocatedLot>,
    /// Greedy fulfillment suggestion drawn from the candidates
    pub suggestion: Vec<LotPick>,
    pub required_quantity: Decimal,
    /// Sum of available quantity over non-expired candidates
    pub total_available: Decimal,
    pub can_fulfill: bool,
}

impl AllocationPlan {
    /// An empty plan for degenerate input (nothing on hand, zero demand)
    pub fn empty(required_quantity: Decimal) -> Self {
        Self {
            lots: Vec::new(),
            suggestion: Vec::new(),
            required_quantity,
            total_available: Decimal::ZERO,
            can_fulfill: required_quantity <= Decimal::ZERO,
        }
    }

    /// Total quantity the suggestion would pick
    pub fn suggested_quantity(&self) -> Decimal {
        self.suggestion.iter().map(|p| p.pick_quantity).sum()
    }
}

/// FEFO comparison: ascending expiry date with missing expiry last, ties
/// broken by ascending production date with missing production date first
pub fn fefo_cmp(a: &StockLot, b: &StockLot) -> Ordering {
    cmp_expiry(a.expiry_date, b.expiry_date)
        .then_with(|| cmp_production(a.production_date, b.production_date))
}

fn cmp_expiry(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_production(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Sort lots into FEFO consumption order (stable)
pub fn sort_lots_fefo(lots: &mut [StockLot]) {
    lots.sort_by(fefo_cmp);
}

/// Build a fulfillment plan for `required_quantity` from the given lots
///
/// Expired lots and lots with no free quantity are excluded from both the
/// suggestion and `total_available`. The walk never assigns more than a lot's
/// available quantity and stops as soon as the demand is covered.
pub fn build_allocation_plan(
    mut lots: Vec<StockLot>,
    required_quantity: Decimal,
    today: NaiveDate,
    warning_days: i64,
) -> AllocationPlan {
    sort_lots_fefo(&mut lots);

    let mut candidates = Vec::new();
    for lot in lots {
        let check = classify_expiry(lot.expiry_date, today, warning_days);
        let available = lot.available_quantity();
        if check.status == ExpiryStatus::Expired || available <= Decimal::ZERO {
            continue;
        }
        candidates.push(AllocatedLot {
            lot,
            status: check.status,
            days_until_expiry: check.days_until_expiry,
            available_quantity: available,
        });
    }

    let total_available: Decimal = candidates.iter().map(|c| c.available_quantity).sum();

    let mut suggestion = Vec::new();
    let mut remaining = required_quantity;
    for candidate in &candidates {
        if remaining <= Decimal::ZERO {
            break;
        }
        let pick = candidate.available_quantity.min(remaining);
        suggestion.push(LotPick {
            lot_id: candidate.lot.id,
            lot_number: candidate.lot.lot_number.clone(),
            bin_location: candidate.lot.bin_location.clone(),
            bin_zone: candidate.lot.bin_zone.clone(),
            pick_quantity: pick,
        });
        remaining -= pick;
    }

    AllocationPlan {
        lots: candidates,
        suggestion,
        required_quantity,
        total_available,
        can_fulfill: remaining <= Decimal::ZERO,
    }
}
