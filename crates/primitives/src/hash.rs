//! Ledger hashing
//!
//! Every digest on the ledger (script hashes, transaction hashes, sighash
//! messages, content hashes) is BLAKE2b-256 keyed with the
//! `ckb-default-hash` personalization. This module is the single place that
//! knows those parameters.
//!
//! ## Example Usage
//!
//! ```
//! use spore_primitives::hash::{blake160, ckb_hash, CkbHasher};
//!
//! let digest = ckb_hash(b"spore");
//!
//! let mut hasher = CkbHasher::new();
//! hasher.update(b"sp");
//! hasher.update(b"ore");
//! assert_eq!(hasher.finalize(), digest);
//!
//! assert_eq!(&blake160(b"spore")[..], &digest[..20]);
//! ```

use alloy_primitives::B256;
use blake2b_simd::{Params, State};

/// Hash size in bytes.
pub const HASH_SIZE: usize = 32;

/// Size of a blake160 digest (truncated ledger hash) in bytes.
pub const BLAKE160_SIZE: usize = 20;

/// Personalization string of the ledger's default hash.
pub const CKB_HASH_PERSONALIZATION: &[u8; 16] = b"ckb-default-hash";

/// Incremental ledger hasher.
#[derive(Debug, Clone)]
pub struct CkbHasher {
    state: State,
}

impl CkbHasher {
    /// Create a hasher with the ledger's default parameters.
    pub fn new() -> Self {
        let state = Params::new()
            .hash_length(HASH_SIZE)
            .personal(CKB_HASH_PERSONALIZATION)
            .to_state();
        Self { state }
    }

    /// Feed bytes into the hasher.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    /// Finish hashing and return the 32-byte digest.
    pub fn finalize(&self) -> B256 {
        B256::from_slice(self.state.finalize().as_bytes())
    }
}

impl Default for CkbHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash `data` with the ledger's default hash.
#[inline]
pub fn ckb_hash(data: &[u8]) -> B256 {
    let mut hasher = CkbHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// First 20 bytes of the ledger hash, used for public key hashes in lock args.
#[inline]
pub fn blake160(data: &[u8]) -> [u8; BLAKE160_SIZE] {
    let digest = ckb_hash(data);
    let mut out = [0u8; BLAKE160_SIZE];
    out.copy_from_slice(&digest[..BLAKE160_SIZE]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_empty_hash() {
        // Well-known hash of the empty message under the ledger personalization
        assert_eq!(
            ckb_hash(&[]),
            b256!("44f4c69744d5f8c55d642062949dcae49bc4e7ef43d388c5a12f42b5633d163e")
        );
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let data: Vec<u8> = (0..=255u8).collect();

        let mut hasher = CkbHasher::new();
        for chunk in data.chunks(7) {
            hasher.update(chunk);
        }

        assert_eq!(hasher.finalize(), ckb_hash(&data));
    }

    #[test]
    fn test_blake160_is_prefix() {
        let digest = ckb_hash(b"hello");
        assert_eq!(&blake160(b"hello")[..], &digest[..BLAKE160_SIZE]);
    }

    #[test]
    fn test_personalization_differs_from_plain_blake2b() {
        let plain = blake2b_simd::Params::new()
            .hash_length(HASH_SIZE)
            .hash(b"hello");
        assert_ne!(plain.as_bytes(), ckb_hash(b"hello").as_slice());
    }
}
