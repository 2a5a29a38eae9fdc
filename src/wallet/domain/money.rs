//! Integer minor-unit currency amounts.

use super::WalletDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative amount of money held as minor units (cents).
///
/// The upper bound is `i64::MAX` so every value fits the `BIGINT` columns
/// used by the `PostgreSQL` schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Money(u64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    const MINOR_PER_MAJOR: u64 = 100;
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Creates an amount from minor units.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::AmountOverflow`] when the value exceeds
    /// `i64::MAX`.
    pub const fn from_minor_units(value: u64) -> Result<Self, WalletDomainError> {
        if value > Self::MAX_PERSISTED_VALUE {
            return Err(WalletDomainError::AmountOverflow);
        }
        Ok(Self(value))
    }

    /// Creates an amount from a persisted signed column value.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::InvalidAmount`] for negative values.
    pub fn from_persisted(value: i64) -> Result<Self, WalletDomainError> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| WalletDomainError::InvalidAmount(value.to_string()))
    }

    /// Parses a decimal amount such as `"12"`, `"12.5"` or `"12.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::InvalidAmount`] when the text is not an
    /// unsigned decimal with at most two fractional digits, or
    /// [`WalletDomainError::AmountOverflow`] when it is too large.
    pub fn parse(text: &str) -> Result<Self, WalletDomainError> {
        let trimmed = text.trim();
        let invalid = || WalletDomainError::InvalidAmount(text.to_owned());
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        let is_digits = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) || fraction.len() > 2 {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        let whole_units: u64 = whole
            .parse()
            .map_err(|_| WalletDomainError::AmountOverflow)?;
        let fraction_units: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse::<u64>().map_err(|_| invalid())?,
        };

        let minor = whole_units
            .checked_mul(Self::MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(fraction_units))
            .ok_or(WalletDomainError::AmountOverflow)?;
        Self::from_minor_units(minor)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Returns the amount as a persisted signed column value.
    #[must_use]
    pub fn to_persisted(self) -> i64 {
        // Construction guarantees the value fits.
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    /// Returns `true` for the zero amount.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::AmountOverflow`] when the sum exceeds the
    /// persisted range.
    pub fn checked_add(self, other: Self) -> Result<Self, WalletDomainError> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or(WalletDomainError::AmountOverflow)?;
        Self::from_minor_units(sum)
    }

    /// Subtracts `other`, returning `None` when the result would be negative.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl TryFrom<u64> for Money {
    type Error = WalletDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_minor_units(value)
    }
}

impl From<Money> for u64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.0.div_euclid(Self::MINOR_PER_MAJOR);
        let minor = self.0.rem_euclid(Self::MINOR_PER_MAJOR);
        write!(f, "{major}.{minor:02}")
    }
}
