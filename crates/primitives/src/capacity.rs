//! Capacity arithmetic
//!
//! Capacity is the ledger's native value, measured in shannons. A cell must
//! hold at least one CKB (10^8 shannons) per byte it occupies.

use std::fmt;
use thiserror::Error;

/// Shannons in one CKB; also the reserve charged per occupied byte.
pub const ONE_CKB: u64 = 100_000_000;

/// Errors from capacity arithmetic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// The result does not fit in 64 bits.
    #[error("capacity overflow")]
    Overflow,

    /// Subtraction would go below zero.
    #[error("capacity underflow: {lhs} - {rhs}")]
    Underflow {
        /// Minuend.
        lhs: Capacity,
        /// Subtrahend.
        rhs: Capacity,
    },

    /// A cell reserves less than it occupies.
    #[error("insufficient cell capacity: holds {capacity}, occupies {occupied}")]
    Insufficient {
        /// Capacity the cell holds.
        capacity: Capacity,
        /// Capacity the cell occupies.
        occupied: Capacity,
    },
}

/// An amount of capacity in shannons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Capacity(u64);

impl Capacity {
    /// Zero capacity.
    pub const ZERO: Self = Self(0);

    /// Capacity from a raw shannon amount.
    #[inline]
    pub const fn shannons(value: u64) -> Self {
        Self(value)
    }

    /// Capacity from whole CKB.
    #[inline]
    pub const fn ckb(value: u64) -> Result<Self, CapacityError> {
        match value.checked_mul(ONE_CKB) {
            Some(v) => Ok(Self(v)),
            None => Err(CapacityError::Overflow),
        }
    }

    /// The reserve required to occupy `bytes` bytes on the ledger.
    #[inline]
    pub const fn bytes(bytes: usize) -> Result<Self, CapacityError> {
        Self::ckb(bytes as u64)
    }

    /// The raw shannon amount.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Checked addition.
    #[inline]
    pub const fn safe_add(self, rhs: Self) -> Result<Self, CapacityError> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Ok(Self(v)),
            None => Err(CapacityError::Overflow),
        }
    }

    /// Checked subtraction.
    #[inline]
    pub const fn safe_sub(self, rhs: Self) -> Result<Self, CapacityError> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Ok(Self(v)),
            None => Err(CapacityError::Underflow { lhs: self, rhs }),
        }
    }

    /// Sum an iterator of capacities, failing on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(iter: I) -> Result<Self, CapacityError> {
        iter.into_iter()
            .try_fold(Self::ZERO, |acc, c| acc.safe_add(c))
    }
}

impl From<u64> for Capacity {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Capacity> for u64 {
    fn from(value: Capacity) -> Self {
        value.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / ONE_CKB;
        let frac = self.0 % ONE_CKB;
        if frac == 0 {
            write!(f, "{whole} CKB")
        } else {
            let frac = format!("{frac:08}");
            write!(f, "{whole}.{} CKB", frac.trim_end_matches('0'))
        }
    }
}
