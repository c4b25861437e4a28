//! Allocation planning tests
//!
//! Exercises the FEFO ordering and the greedy fulfillment walk against
//! hand-built lots, plus property tests over randomly generated stock.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    build_allocation_plan, fefo_cmp, sort_lots_fefo, validate_reservation_within_on_hand, StockLot,
    DEFAULT_WARNING_DAYS,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

/// Build a lot with the given free quantity and expiry offset in days
fn lot(lot_number: &str, quantity: i64, expiry_offset: Option<i64>) -> StockLot {
    lot_full(lot_number, quantity, 0, expiry_offset, None)
}

fn lot_full(
    lot_number: &str,
    quantity: i64,
    reserved: i64,
    expiry_offset: Option<i64>,
    production_offset: Option<i64>,
) -> StockLot {
    StockLot {
        id: Uuid::new_v4(),
        business_id: Uuid::nil(),
        item_id: Uuid::nil(),
        location_id: Uuid::nil(),
        lot_number: lot_number.to_string(),
        expiry_date: expiry_offset.map(|d| today() + Duration::days(d)),
        production_date: production_offset.map(|d| today() + Duration::days(d)),
        quantity: dec(quantity),
        reserved_quantity: dec(reserved),
        bin_location: "A-01-01".to_string(),
        bin_zone: "A".to_string(),
        version: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn plan_for(lots: Vec<StockLot>, required: i64) -> shared::AllocationPlan {
    build_allocation_plan(lots, dec(required), today(), DEFAULT_WARNING_DAYS)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_partial_draw_from_second_lot() {
        // Lot A expires first and is drained; lot B covers the remainder
        let plan = plan_for(vec![lot("B", 5, Some(40)), lot("A", 10, Some(5))], 12);

        assert_eq!(plan.suggestion.len(), 2);
        assert_eq!(plan.suggestion[0].lot_number, "A");
        assert_eq!(plan.suggestion[0].pick_quantity, dec(10));
        assert_eq!(plan.suggestion[1].lot_number, "B");
        assert_eq!(plan.suggestion[1].pick_quantity, dec(2));
        assert_eq!(plan.total_available, dec(15));
        assert!(plan.can_fulfill);
    }

    #[test]
    fn test_shortfall_reports_everything_available() {
        let plan = plan_for(vec![lot("A", 10, Some(5)), lot("B", 5, Some(40))], 20);

        assert_eq!(plan.suggested_quantity(), dec(15));
        assert_eq!(plan.suggestion.len(), 2);
        assert_eq!(plan.total_available, dec(15));
        assert!(!plan.can_fulfill);
    }

    #[test]
    fn test_expired_lot_excluded() {
        let plan = plan_for(vec![lot("OLD", 100, Some(-1)), lot("NEW", 5, Some(40))], 5);

        assert_eq!(plan.total_available, dec(5));
        assert_eq!(plan.suggestion.len(), 1);
        assert_eq!(plan.suggestion[0].lot_number, "NEW");
        assert!(plan.lots.iter().all(|c| c.lot.lot_number != "OLD"));
        assert!(plan.can_fulfill);
    }

    #[test]
    fn test_reserved_quantity_reduces_availability() {
        let plan = plan_for(vec![lot_full("A", 10, 8, Some(5), None)], 5);

        assert_eq!(plan.total_available, dec(2));
        assert_eq!(plan.suggested_quantity(), dec(2));
        assert!(!plan.can_fulfill);
    }

    #[test]
    fn test_fully_reserved_lot_excluded() {
        let plan = plan_for(vec![lot_full("A", 10, 10, Some(5), None)], 1);

        assert!(plan.lots.is_empty());
        assert!(plan.suggestion.is_empty());
        assert!(!plan.can_fulfill);
    }

    #[test]
    fn test_no_expiry_sorts_last() {
        let plan = plan_for(vec![lot("NODATE", 10, None), lot("DATED", 10, Some(60))], 15);

        assert_eq!(plan.suggestion[0].lot_number, "DATED");
        assert_eq!(plan.suggestion[1].lot_number, "NODATE");
        assert_eq!(plan.suggestion[1].pick_quantity, dec(5));
    }

    #[test]
    fn test_production_date_breaks_expiry_tie() {
        let older = lot_full("OLD-RUN", 10, 0, Some(30), Some(-20));
        let newer = lot_full("NEW-RUN", 10, 0, Some(30), Some(-5));
        let no_prod = lot_full("NO-RUN", 10, 0, Some(30), None);

        let mut lots = vec![newer, no_prod, older];
        sort_lots_fefo(&mut lots);

        // Missing production date sorts first within an expiry tie
        assert_eq!(lots[0].lot_number, "NO-RUN");
        assert_eq!(lots[1].lot_number, "OLD-RUN");
        assert_eq!(lots[2].lot_number, "NEW-RUN");
    }

    #[test]
    fn test_zero_required_is_trivially_fulfilled() {
        let plan = plan_for(vec![lot("A", 10, Some(5))], 0);

        assert!(plan.suggestion.is_empty());
        assert!(plan.can_fulfill);
    }

    #[test]
    fn test_empty_stock() {
        let plan = plan_for(Vec::new(), 5);

        assert!(plan.lots.is_empty());
        assert!(plan.suggestion.is_empty());
        assert_eq!(plan.total_available, dec(0));
        assert!(!plan.can_fulfill);
    }

    #[test]
    fn test_reservation_invariant() {
        assert!(validate_reservation_within_on_hand(dec(10), dec(0)).is_ok());
        assert!(validate_reservation_within_on_hand(dec(10), dec(10)).is_ok());
        assert!(validate_reservation_within_on_hand(dec(10), dec(11)).is_err());
        assert!(validate_reservation_within_on_hand(dec(10), dec(-1)).is_err());
    }

    #[test]
    fn test_expiring_lot_still_allocated() {
        // Inside the warning window but not expired: usable stock
        let plan = plan_for(vec![lot("SOON", 10, Some(3))], 5);

        assert!(plan.can_fulfill);
        assert_eq!(plan.suggestion[0].lot_number, "SOON");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_lot() -> impl Strategy<Value = StockLot> {
        (
            1i64..500,
            0i64..500,
            proptest::option::of(-60i64..365),
            proptest::option::of(-365i64..0),
        )
            .prop_map(|(quantity, reserved, expiry, production)| {
                lot_full(
                    "P",
                    quantity,
                    reserved.min(quantity),
                    expiry,
                    production,
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The suggestion never exceeds demand or the stock on hand
        #[test]
        fn prop_suggestion_bounded(
            lots in proptest::collection::vec(arb_lot(), 0..12),
            required in 0i64..2000,
        ) {
            let plan = plan_for(lots, required);
            let suggested = plan.suggested_quantity();

            prop_assert!(suggested <= dec(required));
            prop_assert!(suggested <= plan.total_available);
            prop_assert_eq!(suggested, dec(required).min(plan.total_available));
        }

        /// can_fulfill holds exactly when the non-expired stock covers demand
        #[test]
        fn prop_can_fulfill_iff_covered(
            lots in proptest::collection::vec(arb_lot(), 0..12),
            required in 0i64..2000,
        ) {
            let plan = plan_for(lots, required);
            prop_assert_eq!(plan.can_fulfill, plan.total_available >= dec(required));
        }

        /// No pick exceeds its lot's available quantity
        #[test]
        fn prop_picks_within_availability(
            lots in proptest::collection::vec(arb_lot(), 0..12),
            required in 0i64..2000,
        ) {
            let plan = plan_for(lots, required);
            for pick in &plan.suggestion {
                let candidate = plan
                    .lots
                    .iter()
                    .find(|c| c.lot.id == pick.lot_id)
                    .ok_or_else(|| TestCaseError::fail("pick references unknown lot"))?;
                prop_assert!(pick.pick_quantity > dec(0));
                prop_assert!(pick.pick_quantity <= candidate.available_quantity);
            }
        }

        /// Candidates come out in FEFO order and every pick follows it
        #[test]
        fn prop_candidates_fefo_sorted(
            lots in proptest::collection::vec(arb_lot(), 0..12),
            required in 0i64..2000,
        ) {
            let plan = plan_for(lots, required);
            for pair in plan.lots.windows(2) {
                prop_assert!(fefo_cmp(&pair[0].lot, &pair[1].lot) != std::cmp::Ordering::Greater);
            }
        }

        /// Expired lots never appear among candidates or picks
        #[test]
        fn prop_no_expired_candidates(
            lots in proptest::collection::vec(arb_lot(), 0..12),
            required in 0i64..2000,
        ) {
            let plan = plan_for(lots, required);
            for candidate in &plan.lots {
                if let Some(expiry) = candidate.lot.expiry_date {
                    prop_assert!(expiry >= today());
                }
            }
        }

        /// Planning is a pure function of its inputs
        #[test]
        fn prop_deterministic(
            lots in proptest::collection::vec(arb_lot(), 0..12),
            required in 0i64..2000,
        ) {
            let first = plan_for(lots.clone(), required);
            let second = plan_for(lots, required);

            prop_assert_eq!(first.suggestion, second.suggestion);
            prop_assert_eq!(first.total_available, second.total_available);
            prop_assert_eq!(first.can_fulfill, second.can_fulfill);
        }
    }
}
