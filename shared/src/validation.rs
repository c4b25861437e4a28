//! Validation utilities for the Warehouse Fulfillment Platform

use rust_decimal::Decimal;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate that a requested or received quantity is strictly positive
pub fn validate_quantity_positive(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate the lot invariant `0 <= reserved_quantity <= quantity`
pub fn validate_reservation_within_on_hand(
    quantity: Decimal,
    reserved_quantity: Decimal,
) -> Result<(), &'static str> {
    if reserved_quantity < Decimal::ZERO {
        return Err("Reserved quantity cannot be negative");
    }
    if reserved_quantity > quantity {
        return Err("Reserved quantity cannot exceed on-hand quantity");
    }
    Ok(())
}

/// Clamp a confirmed pick quantity to non-negative
///
/// Pickers sometimes send corrections as deltas; anything below zero is
/// treated as zero rather than rejected.
pub fn clamp_pick_quantity(quantity: Decimal) -> Decimal {
    quantity.max(Decimal::ZERO)
}

/// Validate an alert lookahead window in days
pub fn validate_lookahead_days(days: i64) -> Result<(), &'static str> {
    if days < 0 {
        return Err("Lookahead days cannot be negative");
    }
    if days > 3650 {
        return Err("Lookahead days out of range");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a document number is non-empty and printable
pub fn validate_document_number(number: &str) -> Result<(), &'static str> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err("Document number is required");
    }
    if trimmed.len() > 64 {
        return Err("Document number too long");
    }
    Ok(())
}

/// Validate a bin location code (non-empty, no whitespace)
pub fn validate_bin_location(bin: &str) -> Result<(), &'static str> {
    if bin.trim().is_empty() {
        return Err("Bin location is required");
    }
    if bin.chars().any(char::is_whitespace) {
        return Err("Bin location cannot contain whitespace");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_quantity_positive() {
        assert!(validate_quantity_positive(Decimal::from(1)).is_ok());
        assert!(validate_quantity_positive(Decimal::ZERO).is_err());
        assert!(validate_quantity_positive(Decimal::from(-5)).is_err());
    }

    #[test]
    fn test_validate_reservation_within_on_hand() {
        assert!(validate_reservation_within_on_hand(Decimal::from(10), Decimal::from(10)).is_ok());
        assert!(validate_reservation_within_on_hand(Decimal::from(10), Decimal::from(11)).is_err());
        assert!(validate_reservation_within_on_hand(Decimal::from(10), Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_lookahead_days() {
        assert!(validate_lookahead_days(0).is_ok());
        assert!(validate_lookahead_days(3650).is_ok());
        assert!(validate_lookahead_days(-1).is_err());
        assert!(validate_lookahead_days(3651).is_err());
    }

    #[test]
    fn test_validate_document_number() {
        assert!(validate_document_number("PICK-00017").is_ok());
        assert!(validate_document_number("  ").is_err());
    }

    #[test]
    fn test_validate_bin_location() {
        assert!(validate_bin_location("A-01-01").is_ok());
        assert!(validate_bin_location("A 01").is_err());
        assert!(validate_bin_location("").is_err());
    }

    proptest! {
        #[test]
        fn prop_clamp_never_negative(raw in -100_000i64..100_000) {
            prop_assert!(clamp_pick_quantity(Decimal::from(raw)) >= Decimal::ZERO);
        }
    }
}
