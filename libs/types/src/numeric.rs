//! Integer tick types for prices and quantities
//!
//! The engine is currency-agnostic: a price is a count of ticks and a
//! quantity is a count of lots. Both are plain unsigned integers so that
//! comparisons and sums are exact.
//!
//! Accepted values are capped at `u32::MAX` ticks or lots. Sums over any
//! book that fits in memory then stay far below `u64::MAX`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Limit price in ticks
///
/// Resting and incoming orders always carry a strictly positive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Largest price an order may carry
    pub const MAX: Price = Price(u32::MAX as u64);

    /// Create a price from a raw tick count
    pub const fn from_u64(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Create a price from a signed wire value, rejecting anything non-positive
    pub fn try_from_i64(ticks: i64) -> Option<Self> {
        if ticks > 0 {
            Some(Self(ticks as u64))
        } else {
            None
        }
    }

    /// Raw tick count
    pub const fn ticks(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity in lots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    /// Largest quantity an order may carry
    pub const MAX: Quantity = Quantity(u32::MAX as u64);

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_u64(lots: u64) -> Self {
        Self(lots)
    }

    /// Create a quantity from a signed wire value, rejecting anything non-positive
    pub fn try_from_i64(lots: i64) -> Option<Self> {
        if lots > 0 {
            Some(Self(lots as u64))
        } else {
            None
        }
    }

    pub const fn lots(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Sum that clamps at `u64::MAX` instead of wrapping
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

/// Addition panics on overflow in every build profile, never wraps.
impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("Quantity overflow: {} + {}", self.0, rhs.0))
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Subtraction panics on underflow: a level or order can never give up more
/// quantity than it holds.
impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(rhs.0 <= self.0, "Quantity underflow: {} - {}", self.0, rhs.0);
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
