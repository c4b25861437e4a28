//! Picking route sequencing
//!
//! The route strategy orders the lines of a picking order into a suggested
//! walking sequence. The default implementation is a lexicographic bin/zone
//! sort, not a shortest-path solver; it sits behind a trait so a better
//! heuristic can be swapped in without touching the state machine.

use crate::models::picking::PickingOrderLine;

/// A pluggable ordering heuristic for picking lines
pub trait RouteStrategy {
    /// Return the lines in suggested walking order
    ///
    /// Implementations must be deterministic, must not drop or duplicate
    /// lines, and must preserve the input order of ties.
    fn sequence(&self, lines: Vec<PickingOrderLine>) -> Vec<PickingOrderLine>;
}

/// Default strategy: walk zones lexicographically, bins within a zone
#[derive(Debug, Clone, Copy, Default)]
pub struct BinZoneRoute;

impl RouteStrategy for BinZoneRoute {
    fn sequence(&self, mut lines: Vec<PickingOrderLine>) -> Vec<PickingOrderLine> {
        // Stable sort keeps the original order for lines in the same bin
        lines.sort_by(|a, b| {
            a.bin_zone
                .cmp(&b.bin_zone)
                .then_with(|| a.bin_location.cmp(&b.bin_location))
        });
        lines
    }
}
