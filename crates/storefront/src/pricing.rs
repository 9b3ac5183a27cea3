//! The pricing calculator.
//!
//! The single source of shipping, tax, and totals. Cart views, the checkout
//! review step, and the order manager all call [`quote`]; nothing else in the
//! codebase derives a total, so the numbers cannot drift between screens.
//!
//! Rules:
//! - Shipping is free strictly above the threshold, otherwise a flat rate.
//! - Tax is a flat fraction of the subtotal (no jurisdiction logic).
//! - Amounts are exact decimals; rounding happens only at display time.

use rust_decimal::Decimal;
use serde::Serialize;

/// Order value above which shipping is free (exclusive).
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat shipping rate below the threshold.
pub const FLAT_SHIPPING_RATE: Decimal = Decimal::from_parts(499, 0, 0, false, 2);

/// Flat tax rate applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// A fully derived set of checkout totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Derive shipping, tax, and total from a subtotal.
///
/// Pure and deterministic; negative subtotals are treated as zero (they
/// cannot arise from a well-formed cart).
#[must_use]
pub fn quote(subtotal: Decimal) -> Totals {
    let subtotal = subtotal.max(Decimal::ZERO);
    let shipping = shipping_for(subtotal);
    let tax = subtotal * TAX_RATE;

    Totals {
        subtotal,
        shipping,
        tax,
        total: subtotal + shipping + tax,
    }
}

/// Shipping amount for a subtotal.
#[must_use]
pub fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("literal decimal")
    }

    #[test]
    fn test_constants() {
        assert_eq!(FREE_SHIPPING_THRESHOLD, dec("50"));
        assert_eq!(FLAT_SHIPPING_RATE, dec("4.99"));
        assert_eq!(TAX_RATE, dec("0.10"));
    }

    #[test]
    fn test_shipping_threshold_is_exclusive() {
        // Free strictly above 50, flat at or below
        assert_eq!(shipping_for(dec("50.01")), Decimal::ZERO);
        assert_eq!(shipping_for(dec("50")), dec("4.99"));
        assert_eq!(shipping_for(dec("49.99")), dec("4.99"));
        assert_eq!(shipping_for(Decimal::ZERO), dec("4.99"));
    }

    #[test]
    fn test_tax_is_exact_ten_percent() {
        assert_eq!(quote(dec("10.00")).tax, dec("1.0000"));
        assert_eq!(quote(dec("59.98")).tax, dec("5.9980"));
        assert_eq!(quote(Decimal::ZERO).tax, Decimal::ZERO);
    }

    #[test]
    fn test_total_identity() {
        for subtotal in ["0", "1.50", "49.99", "50", "50.01", "59.98", "123.45"] {
            let t = quote(dec(subtotal));
            assert_eq!(t.total, t.subtotal + t.shipping + t.tax, "at {subtotal}");
        }
    }

    #[test]
    fn test_scenario_above_threshold() {
        // One line: 29.99 × 2
        let t = quote(dec("59.98"));
        assert_eq!(t.subtotal, dec("59.98"));
        assert_eq!(t.shipping, Decimal::ZERO);
        assert_eq!(t.tax, dec("5.998"));
        assert_eq!(t.total, dec("65.978"));
    }

    #[test]
    fn test_scenario_below_threshold() {
        // One line: 10.00 × 1
        let t = quote(dec("10.00"));
        assert_eq!(t.subtotal, dec("10.00"));
        assert_eq!(t.shipping, dec("4.99"));
        assert_eq!(t.tax, dec("1.00"));
        assert_eq!(t.total, dec("15.99"));
    }

    #[test]
    fn test_negative_subtotal_clamped() {
        let t = quote(dec("-5"));
        assert_eq!(t.subtotal, Decimal::ZERO);
        assert_eq!(t.total, dec("4.99"));
    }
}
