//! Picking order state machine and completion gate tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    can_complete, clamp_pick_quantity, unsatisfied_lines, validate_bin_location,
    validate_document_number, validate_quantity_positive, PickingOrderLine, PickingOrderStatus,
};

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

fn line(required: i64, picked_quantity: i64, picked: bool) -> PickingOrderLine {
    PickingOrderLine {
        id: Uuid::new_v4(),
        order_id: Uuid::nil(),
        item_id: Uuid::new_v4(),
        bin_location: "A-01-01".to_string(),
        bin_zone: "A".to_string(),
        lot_number: None,
        required_quantity: dec(required),
        picked_quantity: dec(picked_quantity),
        picked,
        position: 0,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;
    use PickingOrderStatus::*;

    #[test]
    fn test_transition_matrix() {
        let cases = [
            (Open, Open, false),
            (Open, InProgress, true),
            (Open, Completed, true),
            (Open, Cancelled, true),
            (InProgress, Open, false),
            (InProgress, InProgress, false),
            (InProgress, Completed, true),
            (InProgress, Cancelled, true),
            (Completed, Open, false),
            (Completed, InProgress, false),
            (Completed, Completed, false),
            (Completed, Cancelled, false),
            (Cancelled, Open, false),
            (Cancelled, InProgress, false),
            (Cancelled, Completed, false),
            (Cancelled, Cancelled, false),
        ];
        for (from, to, allowed) in cases {
            assert_eq!(
                from.can_transition_to(to),
                allowed,
                "{} -> {}",
                from,
                to
            );
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!Open.is_terminal());
        assert!(!InProgress.is_terminal());
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [Open, InProgress, Completed, Cancelled] {
            assert_eq!(PickingOrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PickingOrderStatus::parse("shipped"), None);
    }

    #[test]
    fn test_line_satisfaction() {
        assert!(line(10, 10, true).is_satisfied());
        assert!(line(10, 12, true).is_satisfied());
        // Quantity alone is not enough without the picked confirmation
        assert!(!line(10, 10, false).is_satisfied());
        assert!(!line(10, 8, true).is_satisfied());
    }

    #[test]
    fn test_over_pick_is_flagged_not_blocking() {
        let over = line(10, 12, true);
        assert!(over.is_over_picked());
        assert!(over.is_satisfied());
        assert!(!line(10, 10, true).is_over_picked());
    }

    #[test]
    fn test_completion_gate() {
        assert!(can_complete(&[line(10, 10, true), line(5, 7, true)]));
        assert!(!can_complete(&[line(10, 10, true), line(5, 4, true)]));
        assert!(!can_complete(&[line(10, 10, true), line(5, 5, false)]));
    }

    #[test]
    fn test_empty_order_cannot_complete() {
        assert!(!can_complete(&[]));
    }

    #[test]
    fn test_unsatisfied_lines_reported() {
        let lines = vec![line(10, 10, true), line(5, 4, true), line(3, 3, false)];
        let blocking = unsatisfied_lines(&lines);
        assert_eq!(blocking.len(), 2);
        assert_eq!(blocking[0].required_quantity, dec(5));
        assert_eq!(blocking[1].required_quantity, dec(3));
    }

    #[test]
    fn test_clamp_pick_quantity() {
        assert_eq!(clamp_pick_quantity(dec(-3)), dec(0));
        assert_eq!(clamp_pick_quantity(dec(0)), dec(0));
        assert_eq!(clamp_pick_quantity(dec(7)), dec(7));
    }

    #[test]
    fn test_document_number_validation() {
        assert!(validate_document_number("PICK-00017").is_ok());
        assert!(validate_document_number("").is_err());
        assert!(validate_document_number("   ").is_err());
        assert!(validate_document_number(&"X".repeat(65)).is_err());
    }

    #[test]
    fn test_bin_location_validation() {
        assert!(validate_bin_location("A-01-01").is_ok());
        assert!(validate_bin_location("").is_err());
        assert!(validate_bin_location("A 01").is_err());
    }

    #[test]
    fn test_quantity_validation() {
        assert!(validate_quantity_positive(dec(1)).is_ok());
        assert!(validate_quantity_positive(dec(0)).is_err());
        assert!(validate_quantity_positive(dec(-1)).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_line() -> impl Strategy<Value = PickingOrderLine> {
        (1i64..200, 0i64..300, any::<bool>())
            .prop_map(|(required, picked_quantity, picked)| line(required, picked_quantity, picked))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// No transition leaves a terminal state
        #[test]
        fn prop_terminal_states_are_final(from in 0usize..4, to in 0usize..4) {
            use PickingOrderStatus::*;
            let states = [Open, InProgress, Completed, Cancelled];
            let (from, to) = (states[from], states[to]);

            if from.is_terminal() {
                prop_assert!(!from.can_transition_to(to));
            }
        }

        /// The gate passes exactly when no line blocks and lines exist
        #[test]
        fn prop_gate_matches_unsatisfied(
            lines in proptest::collection::vec(arb_line(), 0..10),
        ) {
            let gate = can_complete(&lines);
            let blocking = unsatisfied_lines(&lines);
            prop_assert_eq!(gate, !lines.is_empty() && blocking.is_empty());
        }

        /// Clamping is idempotent and never returns a negative quantity
        #[test]
        fn prop_clamp_non_negative(raw in -1000i64..1000) {
            let clamped = clamp_pick_quantity(dec(raw));
            prop_assert!(clamped >= dec(0));
            prop_assert_eq!(clamp_pick_quantity(clamped), clamped);
        }

        /// Raising the picked quantity never unsatisfies a line
        #[test]
        fn prop_satisfaction_monotone(required in 1i64..200, picked_quantity in 0i64..300) {
            let lower = line(required, picked_quantity, true);
            let higher = line(required, picked_quantity + 1, true);
            if lower.is_satisfied() {
                prop_assert!(higher.is_satisfied());
            }
        }
    }
}
