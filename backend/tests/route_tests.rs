//! Route sequencing tests
//!
//! The default strategy is a stable bin/zone sort; these tests pin down the
//! ordering contract the trait demands of every implementation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{BinZoneRoute, PickingOrderLine, RouteStrategy};

fn line(bin_zone: &str, bin_location: &str, position: i32) -> PickingOrderLine {
    PickingOrderLine {
        id: Uuid::new_v4(),
        order_id: Uuid::nil(),
        item_id: Uuid::new_v4(),
        bin_location: bin_location.to_string(),
        bin_zone: bin_zone.to_string(),
        lot_number: None,
        required_quantity: Decimal::ONE,
        picked_quantity: Decimal::ZERO,
        picked: false,
        position,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_zones_walked_in_order() {
        let sequenced = BinZoneRoute.sequence(vec![
            line("C", "C-01", 0),
            line("A", "A-05", 1),
            line("B", "B-02", 2),
        ]);

        let zones: Vec<&str> = sequenced.iter().map(|l| l.bin_zone.as_str()).collect();
        assert_eq!(zones, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_bins_sorted_within_zone() {
        let sequenced = BinZoneRoute.sequence(vec![
            line("A", "A-09", 0),
            line("A", "A-02", 1),
            line("A", "A-05", 2),
        ]);

        let bins: Vec<&str> = sequenced.iter().map(|l| l.bin_location.as_str()).collect();
        assert_eq!(bins, vec!["A-02", "A-05", "A-09"]);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let first = line("A", "A-01", 0);
        let second = line("A", "A-01", 1);
        let (first_id, second_id) = (first.id, second.id);

        let sequenced = BinZoneRoute.sequence(vec![first, second]);
        assert_eq!(sequenced[0].id, first_id);
        assert_eq!(sequenced[1].id, second_id);
    }

    #[test]
    fn test_empty_order() {
        assert!(BinZoneRoute.sequence(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_line() {
        let sequenced = BinZoneRoute.sequence(vec![line("B", "B-03", 0)]);
        assert_eq!(sequenced.len(), 1);
        assert_eq!(sequenced[0].bin_location, "B-03");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_line() -> impl Strategy<Value = PickingOrderLine> {
        ("[A-D]", "[A-D]-0[0-9]", 0i32..100)
            .prop_map(|(zone, bin, position)| line(&zone, &bin, position))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// No line is dropped or duplicated
        #[test]
        fn prop_sequence_is_permutation(
            lines in proptest::collection::vec(arb_line(), 0..20),
        ) {
            let mut input_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
            let sequenced = BinZoneRoute.sequence(lines);
            let mut output_ids: Vec<Uuid> = sequenced.iter().map(|l| l.id).collect();

            input_ids.sort();
            output_ids.sort();
            prop_assert_eq!(input_ids, output_ids);
        }

        /// Output is sorted by zone, then bin
        #[test]
        fn prop_sequence_sorted(
            lines in proptest::collection::vec(arb_line(), 0..20),
        ) {
            let sequenced = BinZoneRoute.sequence(lines);
            for pair in sequenced.windows(2) {
                let a = (&pair[0].bin_zone, &pair[0].bin_location);
                let b = (&pair[1].bin_zone, &pair[1].bin_location);
                prop_assert!(a <= b);
            }
        }

        /// Sequencing an already-sequenced order changes nothing
        #[test]
        fn prop_sequence_idempotent(
            lines in proptest::collection::vec(arb_line(), 0..20),
        ) {
            let once = BinZoneRoute.sequence(lines);
            let once_ids: Vec<Uuid> = once.iter().map(|l| l.id).collect();
            let twice = BinZoneRoute.sequence(once);
            let twice_ids: Vec<Uuid> = twice.iter().map(|l| l.id).collect();

            prop_assert_eq!(once_ids, twice_ids);
        }
    }
}
