//! Value objects for the stock context.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};
use stockroom_core::error::DomainError;

/// A non-negative number of stock units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockQuantity(u64);

impl StockQuantity {
    /// No units.
    pub const ZERO: Self = Self(0);

    /// Creates a quantity from a raw signed value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuantity` if `value` is negative.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| DomainError::InvalidQuantity)
    }

    /// Creates a quantity that must be strictly positive, as required for an
    /// amount being added.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuantity` if `value` is zero or negative.
    pub fn positive(value: i64) -> Result<Self, DomainError> {
        match Self::new(value)? {
            Self::ZERO => Err(DomainError::InvalidQuantity),
            quantity => Ok(quantity),
        }
    }

    /// Wraps an already non-negative unit count.
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Returns the underlying unit count.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` if this quantity is strictly greater than `limit`.
    #[must_use]
    pub fn exceeds(self, limit: Self) -> bool {
        self.0 > limit.0
    }
}

impl Add for StockQuantity {
    type Output = Self;

    // Overflow is outside the domain's value range.
    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for StockQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
