//! Type-safe money representation using decimal arithmetic.
//!
//! Amounts are [`rust_decimal::Decimal`] in the currency's standard unit
//! (dollars, not cents) and never floats. Arithmetic across currencies is a
//! programming error surfaced as [`MoneyError::CurrencyMismatch`] rather than
//! a silently wrong total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors from money arithmetic.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: CurrencyCode,
        /// Currency of the right operand.
        right: CurrencyCode,
    },
    /// The arithmetic overflowed `Decimal`'s range.
    #[error("money arithmetic overflow")]
    Overflow,
}

/// A monetary amount with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Build from the currency's minor unit (e.g., cents for USD).
    #[must_use]
    pub fn from_minor(minor: i64, currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(minor, 2),
            currency,
        }
    }

    /// Add another amount of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] if the currencies differ and
    /// [`MoneyError::Overflow`] if the sum leaves `Decimal`'s range.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            amount,
            currency: self.currency,
        })
    }

    /// Multiply by a line quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product leaves `Decimal`'s range.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, MoneyError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            amount,
            currency: self.currency,
        })
    }

    /// Is this exactly zero?
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format for display, e.g. `$19.99`.
    ///
    /// Rounds to two decimal places (banker's rounding) for presentation
    /// only; stored amounts keep their full precision.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.amount.round_dp(2))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Error parsing a [`CurrencyCode`] from its ISO string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency codes supported by the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// US dollar - the base currency every stored amount is denominated in.
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The currency all prices are stored in; exchange rates are relative to it.
    pub const BASE: Self = Self::USD;

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(CurrencyCodeError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, CurrencyCode::USD)
    }

    #[test]
    fn test_from_minor() {
        assert_eq!(usd(499).amount, Decimal::new(499, 2));
        assert_eq!(usd(499).display(), "$4.99");
    }

    #[test]
    fn test_checked_add() {
        let total = usd(2999).checked_add(usd(1000)).unwrap();
        assert_eq!(total, usd(3999));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let eur = Money::from_minor(100, CurrencyCode::EUR);
        assert_eq!(
            usd(100).checked_add(eur),
            Err(MoneyError::CurrencyMismatch {
                left: CurrencyCode::USD,
                right: CurrencyCode::EUR,
            })
        );
    }

    #[test]
    fn test_checked_mul() {
        // 29.99 * 2 = 59.98
        assert_eq!(usd(2999).checked_mul(2).unwrap(), usd(5998));
        assert_eq!(usd(2999).checked_mul(0).unwrap(), usd(0));
    }

    #[test]
    fn test_display_pads_and_rounds() {
        assert_eq!(usd(1950).display(), "$19.50");
        // 5.998 rounds to 6.00 for display only
        let tax = Money::new(Decimal::new(5998, 3), CurrencyCode::USD);
        assert_eq!(tax.display(), "$6.00");
        assert_eq!(
            Money::from_minor(1000, CurrencyCode::GBP).display(),
            "£10.00"
        );
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("EUR".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_zero() {
        assert!(Money::zero(CurrencyCode::USD).is_zero());
        assert!(!usd(1).is_zero());
    }
}
