//! Monetary amounts using rust_decimal for precision
//!
//! Amounts are carried as integer minor units (`i64`, two decimal places)
//! everywhere in storage and on the wire to the payment gateway. `Decimal`
//! is used only at the boundary: parsing operator-entered prices and
//! formatting amounts for human-readable messages. Floating point is never
//! involved.

use rust_decimal::prelude::*;
use thiserror::Error;

/// Number of decimal places carried by a minor-unit amount
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed amount (1,000,000.00 in minor units)
pub const MAX_AMOUNT: i64 = 100_000_000;

/// Maximum allowed quantity per order line
pub const MAX_QUANTITY: i64 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount has more than {DECIMAL_PLACES} decimal places: {0}")]
    TooPrecise(String),
    #[error("amount must be non-negative: {0}")]
    Negative(String),
    #[error("amount exceeds maximum allowed: {0}")]
    TooLarge(String),
}

/// Parse a decimal string ("125.50") into minor units (12550).
///
/// Rejects negative values, more than two decimal places, and amounts
/// beyond [`MAX_AMOUNT`]. Operator input is never rounded silently.
pub fn parse_units(value: &str) -> Result<i64, MoneyError> {
    let dec: Decimal = value
        .trim()
        .parse()
        .map_err(|_| MoneyError::Invalid(value.to_string()))?;
    if dec.is_sign_negative() {
        return Err(MoneyError::Negative(value.to_string()));
    }
    let scaled = dec * Decimal::from(100);
    if scaled.fract() != Decimal::ZERO {
        return Err(MoneyError::TooPrecise(value.to_string()));
    }
    let minor = scaled
        .to_i64()
        .ok_or_else(|| MoneyError::TooLarge(value.to_string()))?;
    if minor > MAX_AMOUNT {
        return Err(MoneyError::TooLarge(value.to_string()));
    }
    Ok(minor)
}

/// Format minor units as a decimal string: 12550 -> "125.50"
pub fn format_units(minor: i64) -> String {
    Decimal::new(minor, DECIMAL_PLACES).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_plain() {
        assert_eq!(parse_units("125.50"), Ok(12550));
        assert_eq!(parse_units("0"), Ok(0));
        assert_eq!(parse_units("100"), Ok(10000));
        assert_eq!(parse_units("0.01"), Ok(1));
        assert_eq!(parse_units(" 3.7 "), Ok(370));
    }

    #[test]
    fn test_parse_units_rejects_precision() {
        assert_eq!(
            parse_units("1.005"),
            Err(MoneyError::TooPrecise("1.005".to_string()))
        );
    }

    #[test]
    fn test_parse_units_rejects_negative() {
        assert_eq!(
            parse_units("-5"),
            Err(MoneyError::Negative("-5".to_string()))
        );
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(parse_units("12,50").is_err());
        assert!(parse_units("abc").is_err());
        assert!(parse_units("").is_err());
    }

    #[test]
    fn test_parse_units_rejects_too_large() {
        assert_eq!(
            parse_units("1000000.01"),
            Err(MoneyError::TooLarge("1000000.01".to_string()))
        );
        // Exactly the maximum is fine
        assert_eq!(parse_units("1000000.00"), Ok(MAX_AMOUNT));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(12550), "125.50");
        assert_eq!(format_units(0), "0.00");
        assert_eq!(format_units(1), "0.01");
        assert_eq!(format_units(10000), "100.00");
    }

    #[test]
    fn test_roundtrip() {
        for minor in [0, 1, 99, 100, 12345, MAX_AMOUNT] {
            assert_eq!(parse_units(&format_units(minor)), Ok(minor));
        }
    }
}
