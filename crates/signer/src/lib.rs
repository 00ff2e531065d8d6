//! Key handling and signing for the default CKB lock.
//!
//! A [`Secp256k1Signer`] owns a private key and knows the lock script that
//! guards its cells: the secp256k1/blake160 lock with the blake160 hash of
//! the compressed public key as args. Signatures are deterministic, so
//! signing the same message twice yields the same bytes.
//!
//! # Example
//!
//! ```
//! use spore_signer::Secp256k1Signer;
//! use alloy_primitives::B256;
//!
//! let signer: Secp256k1Signer =
//!     "0x0000000000000000000000000000000000000000000000000000000000000001".parse().unwrap();
//! let signature = signer.sign_message(&B256::repeat_byte(7)).unwrap();
//! assert_eq!(signature.len(), 65);
//! assert_eq!(signer.lock_script().args().len(), 20);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
mod signer;

pub use error::SignerError;
pub use signer::{PUBLIC_KEY_SIZE, Secp256k1Signer, recover_lock_args};
