//! Fixed-point money helpers
//!
//! Every stored amount carries exactly two fractional digits. Inputs finer
//! than one minor unit are rejected rather than rounded.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::result::{Error, Result};

/// Number of minor-unit digits on every stored amount
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a stored amount may have: the `DECIMAL(18, 2)` ceiling
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999_999_999, MONEY_SCALE)
}

/// Bring a value to the stored scale
///
/// Values finer than one minor unit, or too large to be held at two
/// decimal places within `max_money()`, are rejected.
pub fn to_money(value: Decimal) -> Result<Decimal> {
    let mut normalized = value.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(Error::invalid_argument(format!(
            "amount {} has more than {} decimal places",
            value, MONEY_SCALE
        )));
    }
    normalized.rescale(MONEY_SCALE);
    if normalized.scale() != MONEY_SCALE || normalized.abs() > max_money() {
        return Err(Error::invalid_argument(format!(
            "amount {} exceeds the maximum of {}",
            value,
            max_money()
        )));
    }
    Ok(normalized)
}

/// `a + b`, rejected when the sum leaves the storable range
pub fn add_money(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| Error::invalid_argument(format!("{} + {} overflows", a, b)))
        .and_then(to_money)
}

/// `a - b`, rejected when the difference leaves the storable range
pub fn sub_money(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| Error::invalid_argument(format!("{} - {} overflows", a, b)))
        .and_then(to_money)
}

/// Parse a user-supplied amount such as `250000`, `250000.5` or `1,000,000.00`
pub fn parse_money(input: &str) -> Result<Decimal> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let value = Decimal::from_str(&cleaned)
        .map_err(|_| Error::invalid_argument(format!("invalid amount: {}", input)))?;
    to_money(value)
}

/// Amount moved by a debit or credit: strictly positive
pub fn require_positive(amount: Decimal) -> Result<Decimal> {
    let amount = to_money(amount)?;
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_argument(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Amount compared or stored as a balance: zero allowed
pub fn require_non_negative(amount: Decimal) -> Result<Decimal> {
    let amount = to_money(amount)?;
    if amount < Decimal::ZERO {
        return Err(Error::invalid_argument(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_accepts_grouping() {
        assert_eq!(
            parse_money("1,000,000.00").unwrap(),
            Decimal::new(100_000_000, 2)
        );
        assert_eq!(parse_money("250000").unwrap().to_string(), "250000.00");
        assert_eq!(parse_money(" 0.5 ").unwrap().to_string(), "0.50");
    }

    #[test]
    fn test_sub_minor_unit_is_rejected() {
        assert!(matches!(
            parse_money("10.005"),
            Err(Error::InvalidArgument(_))
        ));
        // trailing zeros beyond the scale are not real precision
        assert_eq!(parse_money("10.5000").unwrap().to_string(), "10.50");
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert!(parse_money("ten").is_err());
        assert!(parse_money("").is_err());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive(Decimal::ZERO).is_err());
        assert!(require_positive(Decimal::new(-1, 2)).is_err());
        assert_eq!(
            require_positive(Decimal::new(1, 2)).unwrap(),
            Decimal::new(1, 2)
        );
    }

    #[test]
    fn test_max_money_is_the_storage_ceiling() {
        let max = max_money();
        assert_eq!(max.to_string(), "9999999999999999.99");
        assert_eq!(to_money(max).unwrap(), max);
        assert_eq!(to_money(-max).unwrap(), -max);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(matches!(
            parse_money("10000000000000000"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            to_money(max_money() + Decimal::new(1, 2)),
            Err(Error::InvalidArgument(_))
        ));
        // too many integer digits to carry a scale of 2 at all
        assert!(matches!(to_money(Decimal::MAX), Err(Error::InvalidArgument(_))));
        assert!(matches!(to_money(Decimal::MIN), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            add_money(Decimal::new(150, 2), Decimal::new(250, 2)).unwrap().to_string(),
            "4.00"
        );
        assert!(matches!(
            add_money(max_money(), Decimal::new(1, 2)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            add_money(Decimal::MAX, Decimal::MAX),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            sub_money(Decimal::MIN, Decimal::MAX),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative(Decimal::ZERO).is_ok());
        assert!(require_non_negative(Decimal::new(-1, 0)).is_err());
    }
}
