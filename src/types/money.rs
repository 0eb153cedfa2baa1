//! Money types for the trip ledger
//!
//! Amounts are always integer minor units (cents). Decimal strings only
//! appear at the journal boundary, where `rust_decimal` converts them
//! exactly; the engine itself never touches fractional values.

use super::error::LedgerError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Amount in minor currency units
pub type Cents = i64;

/// Number of decimal places carried by one minor unit
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Three-letter ISO 4217 style currency code, stored upper-case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Parse a currency code, trimming and upper-casing the input first
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidCurrency` unless the trimmed input is
    /// exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, LedgerError> {
        let normalized = code.trim().to_ascii_uppercase();
        match normalized.as_bytes() {
            [a, b, c] if [a, b, c].iter().all(|ch| ch.is_ascii_uppercase()) => {
                Ok(CurrencyCode([*a, *b, *c]))
            }
            _ => Err(LedgerError::invalid_currency(code)),
        }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII upper-case letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for CurrencyCode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::parse(s)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer amount tagged with its currency
///
/// This is the form amounts take when they leave the engine in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    pub cents: Cents,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(cents: Cents, currency: CurrencyCode) -> Self {
        Money { cents, currency }
    }

    /// Two-decimal major-unit text, e.g. "-0.34"
    pub fn major_units(&self) -> String {
        format_cents(self.cents)
    }
}

/// Parse a major-unit decimal string ("12.5", "12.50", "12") into cents
///
/// At most two decimal places are accepted and negative values are
/// rejected. Whether zero is acceptable is decided by the caller.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` for malformed, negative, over-precise
/// or out-of-range input.
pub fn parse_cents(amount: &str) -> Result<Cents, LedgerError> {
    let trimmed = amount.trim();
    let decimal = Decimal::from_str(trimmed).map_err(|_| LedgerError::invalid_amount(trimmed))?;

    if decimal.is_sign_negative() || decimal.scale() > MINOR_UNIT_SCALE {
        return Err(LedgerError::invalid_amount(trimmed));
    }

    let scaled = decimal
        .checked_mul(Decimal::from(10_i64.pow(MINOR_UNIT_SCALE)))
        .ok_or_else(|| LedgerError::invalid_amount(trimmed))?
        .normalize();

    // The scale check above guarantees an integral result here
    i64::try_from(scaled.mantissa())
        .ok()
        .filter(|_| scaled.scale() == 0)
        .ok_or_else(|| LedgerError::invalid_amount(trimmed))
}

/// Render cents as a two-decimal major-unit string ("-0.34", "30.00")
pub fn format_cents(cents: Cents) -> String {
    format!("{:.2}", Decimal::new(cents, MINOR_UNIT_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whole("100", 10000)]
    #[case::one_decimal("12.5", 1250)]
    #[case::two_decimals("0.34", 34)]
    #[case::padded("  60.00  ", 6000)]
    #[case::zero("0", 0)]
    #[case::trailing_zero_scale("1.10", 110)]
    fn test_parse_cents_valid(#[case] input: &str, #[case] expected: Cents) {
        assert_eq!(parse_cents(input).unwrap(), expected);
    }

    #[rstest]
    #[case::negative("-1.00")]
    #[case::three_decimals("1.005")]
    #[case::garbage("ten")]
    #[case::empty("")]
    fn test_parse_cents_rejects(#[case] input: &str) {
        assert!(matches!(
            parse_cents(input),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[rstest]
    #[case(0, "0.00")]
    #[case(34, "0.34")]
    #[case(-34, "-0.34")]
    #[case(3000, "30.00")]
    #[case(123456, "1234.56")]
    fn test_format_cents(#[case] cents: Cents, #[case] expected: &str) {
        assert_eq!(format_cents(cents), expected);
    }

    #[rstest]
    #[case("USD", "USD")]
    #[case("usd", "USD")]
    #[case(" eur ", "EUR")]
    fn test_currency_code_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case::too_short("US")]
    #[case::too_long("USDX")]
    #[case::digits("U5D")]
    #[case::empty("")]
    #[case::non_ascii("ÜSD")]
    fn test_currency_code_rejects(#[case] input: &str) {
        assert!(matches!(
            CurrencyCode::parse(input),
            Err(LedgerError::InvalidCurrency { .. })
        ));
    }

    #[rstest]
    #[case::debt(3400, "34.00")]
    #[case::credit(-34, "-0.34")]
    #[case::zero(0, "0.00")]
    fn test_money_major_units(#[case] cents: Cents, #[case] expected: &str) {
        let money = Money::new(cents, CurrencyCode::parse("usd").unwrap());
        assert_eq!(money.major_units(), expected);
        assert_eq!(money.currency.as_str(), "USD");
    }
}
