//! Tick conversion utilities.
//!
//! ## Overview
//!
//! The book keys levels by integer ticks. Display and configuration work in
//! decimal prices; this module converts between the two for a given tick
//! size without floating point.
//!
//! ## Examples
//!
//! ```
//! use lob_core::types::price::{parse_tick_size, to_ticks, format_ticks};
//!
//! let tick = parse_tick_size("0.01").unwrap();
//! assert_eq!(to_ticks("101.25", tick), Some(10_125));
//! assert_eq!(format_ticks(10_125, tick), "101.25");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::types::order::Price;

/// Default tick size: one whole unit per tick.
pub const DEFAULT_TICK_SIZE: Decimal = Decimal::ONE;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Parse a tick size, rejecting zero and negative values.
pub fn parse_tick_size(s: &str) -> Option<Decimal> {
    let tick = Decimal::from_str(s.trim()).ok()?;
    if tick.is_sign_negative() || tick.is_zero() {
        return None;
    }
    Some(tick)
}

/// Convert a decimal price string to ticks.
///
/// Returns `None` if the string does not parse, is negative, is not an exact
/// multiple of `tick_size`, or does not fit in a `u64`.
///
/// ```
/// use lob_core::types::price::{parse_tick_size, to_ticks};
///
/// let tick = parse_tick_size("0.5").unwrap();
/// assert_eq!(to_ticks("2.5", tick), Some(5));
/// assert_eq!(to_ticks("2.25", tick), None);
/// ```
pub fn to_ticks(s: &str, tick_size: Decimal) -> Option<Price> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_ticks(decimal, tick_size)
}

/// Convert a Decimal price to ticks. See [`to_ticks`].
pub fn decimal_to_ticks(d: Decimal, tick_size: Decimal) -> Option<Price> {
    if d.is_sign_negative() || tick_size.is_zero() {
        return None;
    }

    let ticks = d.checked_div(tick_size)?;
    if !ticks.fract().is_zero() {
        return None;
    }
    ticks.to_u64()
}

/// Convert ticks back to a Decimal price.
pub fn ticks_to_decimal(ticks: Price, tick_size: Decimal) -> Decimal {
    Decimal::from(ticks) * tick_size
}

/// Render ticks as a decimal string with trailing zeros trimmed.
pub fn format_ticks(ticks: Price, tick_size: Decimal) -> String {
    ticks_to_decimal(ticks, tick_size).normalize().to_string()
}

/// Midpoint of a bid and an ask, in decimal price units.
///
/// Returns `None` when either side is missing.
pub fn mid_price(bid: Option<Price>, ask: Option<Price>, tick_size: Decimal) -> Option<Decimal> {
    let (bid, ask) = (bid?, ask?);
    let sum = ticks_to_decimal(bid, tick_size).checked_add(ticks_to_decimal(ask, tick_size))?;
    sum.checked_div(Decimal::TWO).map(|m| m.normalize())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(s: &str) -> Decimal {
        parse_tick_size(s).unwrap()
    }

    #[test]
    fn test_parse_tick_size() {
        assert_eq!(parse_tick_size("1"), Some(Decimal::ONE));
        assert_eq!(parse_tick_size(" 0.01 "), Some(Decimal::new(1, 2)));
        assert_eq!(parse_tick_size("0"), None);
        assert_eq!(parse_tick_size("-0.5"), None);
        assert_eq!(parse_tick_size("abc"), None);
    }

    #[test]
    fn test_to_ticks_unit_tick() {
        assert_eq!(to_ticks("100", DEFAULT_TICK_SIZE), Some(100));
        assert_eq!(to_ticks("0", DEFAULT_TICK_SIZE), Some(0));
        assert_eq!(to_ticks("100.5", DEFAULT_TICK_SIZE), None);
    }

    #[test]
    fn test_to_ticks_fractional_tick() {
        assert_eq!(to_ticks("101.25", tick("0.01")), Some(10_125));
        assert_eq!(to_ticks("101.255", tick("0.01")), None);
        assert_eq!(to_ticks("-1", tick("0.01")), None);
        assert_eq!(to_ticks("", tick("0.01")), None);
    }

    #[test]
    fn test_format_ticks() {
        assert_eq!(format_ticks(10_125, tick("0.01")), "101.25");
        assert_eq!(format_ticks(10_000, tick("0.01")), "100");
        assert_eq!(format_ticks(7, DEFAULT_TICK_SIZE), "7");
    }

    #[test]
    fn test_mid_price() {
        assert_eq!(mid_price(Some(99), Some(101), DEFAULT_TICK_SIZE), Some(Decimal::from(100)));
        assert_eq!(
            mid_price(Some(100), Some(101), DEFAULT_TICK_SIZE),
            Some(Decimal::new(1005, 1))
        );
        assert_eq!(mid_price(None, Some(101), DEFAULT_TICK_SIZE), None);
        assert_eq!(mid_price(Some(99), None, DEFAULT_TICK_SIZE), None);
    }
}
