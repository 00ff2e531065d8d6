//! Error types for key handling and signing.

use thiserror::Error;

/// Errors that can occur when loading keys or signing.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The key is not valid hex.
    #[error(transparent)]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    /// The key has the wrong length.
    #[error("private key must be 32 bytes, got {0}")]
    KeyLength(usize),

    /// The key is not a valid secp256k1 scalar.
    #[error("invalid private key")]
    InvalidKey(#[source] k256::ecdsa::Error),

    /// Signing or recovery failed.
    #[error(transparent)]
    Ecdsa(#[from] k256::ecdsa::Error),
}
