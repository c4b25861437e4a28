//! Picking order models and completion gates
//!
//! A picking order is a work order directing retrieval of quantities from
//! bins to fulfill an outbound document. Orders move through a bounded
//! lifecycle; completion is an all-or-nothing gate over the lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Picking order lifecycle
///
/// `open → in_progress → completed`, with `cancelled` reachable from any
/// non-terminal state. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PickingOrderStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl PickingOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickingOrderStatus::Open => "open",
            PickingOrderStatus::InProgress => "in_progress",
            PickingOrderStatus::Completed => "completed",
            PickingOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(PickingOrderStatus::Open),
            "in_progress" => Some(PickingOrderStatus::InProgress),
            "completed" => Some(PickingOrderStatus::Completed),
            "cancelled" => Some(PickingOrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PickingOrderStatus::Completed | PickingOrderStatus::Cancelled
        )
    }

    /// Explicit transition matrix for the state machine
    pub fn can_transition_to(&self, next: PickingOrderStatus) -> bool {
        use PickingOrderStatus::*;
        match (self, next) {
            (Open, InProgress) | (Open, Completed) | (Open, Cancelled) => true,
            (InProgress, Completed) | (InProgress, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PickingOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A picking work order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickingOrder {
    pub id: Uuid,
    pub business_id: Uuid,
    /// Document number assigned by the host application (e.g., "PICK-00017")
    pub picking_number: String,
    /// Outbound document this order fulfills
    pub source_document_type: String,
    pub source_document_id: Uuid,
    pub picker_id: Option<Uuid>,
    pub status: PickingOrderStatus,
    /// Optimistic lock counter, bumped on every line or status change
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One line of a picking order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickingOrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub bin_location: String,
    pub bin_zone: String,
    /// Pinned once the picker confirms which batch was taken
    pub lot_number: Option<String>,
    pub required_quantity: Decimal,
    pub picked_quantity: Decimal,
    pub picked: bool,
    /// Position within the order as created by the outbound document
    pub position: i32,
}

impl PickingOrderLine {
    /// A line satisfies the completion gate when it is confirmed picked and
    /// the confirmed quantity covers the requirement
    pub fn is_satisfied(&self) -> bool {
        self.picked && self.picked_quantity >= self.required_quantity
    }

    /// Over-picking is tolerated but surfaced to the caller
    pub fn is_over_picked(&self) -> bool {
        self.picked_quantity > self.required_quantity
    }
}

/// Lines that block completion of the order
pub fn unsatisfied_lines(lines: &[PickingOrderLine]) -> Vec<&PickingOrderLine> {
    lines.iter().filter(|l| !l.is_satisfied()).collect()
}

/// Whether the order-level completion gate passes
pub fn can_complete(lines: &[PickingOrderLine]) -> bool {
    !lines.is_empty() && lines.iter().all(PickingOrderLine::is_satisfied)
}
