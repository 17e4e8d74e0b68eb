//! Type-safe price representation using decimal arithmetic.
//!
//! The commerce API owns all pricing; these values are a read-only mirror
//! and are never sent back, so only decimal math and display formatting
//! live here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a USD price from a bare decimal amount.
    ///
    /// The commerce API quotes prices as unannotated decimals in USD.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// The price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Format for display with two decimal places (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimal_places() {
        let price = Price::usd(Decimal::new(999, 2)); // 9.99
        assert_eq!(price.display(), "$9.99");

        let whole = Price::usd(Decimal::from(10));
        assert_eq!(whole.display(), "$10.00");
    }

    #[test]
    fn test_times() {
        let price = Price::usd(Decimal::from(10));
        assert_eq!(price.times(2).display(), "$20.00");
    }

    #[test]
    fn test_zero_price() {
        let free = Price::usd(Decimal::ZERO);
        assert_eq!(free.display(), "$0.00");
    }

    #[test]
    fn test_non_usd_symbol() {
        let price = Price::new(Decimal::new(500, 2), CurrencyCode::EUR);
        assert_eq!(price.display(), "\u{20ac}5.00");
    }
}
