//! Fee calculation.
//!
//! A transaction pays `ceil(size * rate / 1000)` shannons, where `size` is
//! the bytes it occupies in a block. Since signatures are not known while a
//! transaction is being funded, the size is taken from the skeleton with a
//! zeroed signature-sized lock in every signing witness. Signatures have
//! exactly that size, so the estimate never falls below the signed size.

use spore_primitives::{Capacity, CapacityError};

use crate::skeleton::TransactionSkeleton;

/// Bytes per fee-rate unit.
const KB: u64 = 1000;

/// Fee rate in shannons per 1000 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FeeRate(u64);

impl FeeRate {
    /// The node's default minimum rate.
    pub const DEFAULT: Self = Self(1000);

    /// A rate of `shannons_per_kb` shannons per 1000 bytes.
    #[inline]
    pub const fn new(shannons_per_kb: u64) -> Self {
        Self(shannons_per_kb)
    }

    /// Shannons per 1000 bytes.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fee for a transaction of `size` bytes.
pub fn calculate_fee(size: usize, rate: FeeRate) -> Result<Capacity, CapacityError> {
    let size = u64::try_from(size).map_err(|_| CapacityError::Overflow)?;
    let fee = size
        .checked_mul(rate.0)
        .ok_or(CapacityError::Overflow)?
        .div_ceil(KB);
    Ok(Capacity::shannons(fee))
}

/// Upper-bound fee for the skeleton once signed.
pub fn estimate_fee(
    skeleton: &TransactionSkeleton,
    rate: FeeRate,
) -> Result<Capacity, CapacityError> {
    calculate_fee(skeleton.estimated_size(), rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rounds_up() {
        assert_eq!(calculate_fee(1000, FeeRate::DEFAULT).unwrap(), Capacity::shannons(1000));
        assert_eq!(calculate_fee(1, FeeRate::DEFAULT).unwrap(), Capacity::shannons(1));
        assert_eq!(calculate_fee(1, FeeRate::new(1)).unwrap(), Capacity::shannons(1));
        assert_eq!(calculate_fee(1001, FeeRate::new(3)).unwrap(), Capacity::shannons(4));
        assert_eq!(calculate_fee(0, FeeRate::DEFAULT).unwrap(), Capacity::ZERO);
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            calculate_fee(usize::MAX, FeeRate::new(u64::MAX)),
            Err(CapacityError::Overflow)
        );
    }

    proptest! {
        #[test]
        fn test_monotonic_in_size(size in 0usize..1_000_000, extra in 0usize..10_000, rate in 1u64..100_000) {
            let rate = FeeRate::new(rate);
            let small = calculate_fee(size, rate).unwrap();
            let large = calculate_fee(size + extra, rate).unwrap();
            prop_assert!(small <= large);
            prop_assert!(small.as_u64() * KB >= size as u64 * rate.as_u64());
        }
    }
}
