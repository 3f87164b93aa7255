//! Type-safe price representation using decimal arithmetic.
//!
//! All prices in the store are Sri Lankan rupees. The backend sends plain
//! JSON numbers, so `Price` (de)serializes as a float while all arithmetic
//! stays in [`Decimal`].

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// A rupee amount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Currency prefix used when rendering prices.
    pub const SYMBOL: &'static str = "Rs.";

    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Price after taking `percent` off, rounded to cents.
    ///
    /// Percentages above 100 are clamped so a price never goes negative.
    #[must_use]
    pub fn percent_off(self, percent: u8) -> Self {
        let percent = Decimal::from(percent.min(100));
        let discounted = self.0 * (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED;
        Self(discounted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Format for display, e.g. `Rs. 12,500.00`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {}", Self::SYMBOL, self.plain())
    }

    /// Format without the currency prefix, e.g. `12,500.00`.
    #[must_use]
    pub fn plain(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{grouped}.{cents}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().replace(',', "").parse::<Decimal>().map(Self)
    }
}
