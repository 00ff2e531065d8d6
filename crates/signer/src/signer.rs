//! The secp256k1/blake160 signer.

use alloy_primitives::{B256, hex};
use core::{fmt, str::FromStr};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use spore_networks::SECP256K1_BLAKE160_CODE_HASH;
use spore_primitives::hash::BLAKE160_SIZE;
use spore_primitives::{SIGNATURE_SIZE, Script, ScriptHashType, blake160};

use crate::SignerError;

/// Length of a compressed secp256k1 public key.
pub const PUBLIC_KEY_SIZE: usize = 33;

const PRIVATE_KEY_SIZE: usize = 32;

/// A wallet key for the default secp256k1/blake160 lock.
#[derive(Clone)]
pub struct Secp256k1Signer {
    key: SigningKey,
    lock_args: [u8; BLAKE160_SIZE],
}

impl Secp256k1Signer {
    /// Creates a signer from a raw 32-byte private key.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidKey`] if the bytes are zero or not
    /// below the curve order.
    pub fn from_bytes(bytes: &B256) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(bytes.as_slice()).map_err(SignerError::InvalidKey)?;
        let lock_args = blake160(&compressed_public_key(key.verifying_key()));
        Ok(Self { key, lock_args })
    }

    /// Creates a signer from a hex private key, with or without `0x`.
    pub fn from_hex(key: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(key.trim())?;
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(SignerError::KeyLength(bytes.len()));
        }
        Self::from_bytes(&B256::from_slice(&bytes))
    }

    /// The compressed public key.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        compressed_public_key(self.key.verifying_key())
    }

    /// Blake160 of the compressed public key.
    #[inline]
    pub const fn lock_args(&self) -> &[u8; BLAKE160_SIZE] {
        &self.lock_args
    }

    /// The lock script guarding this key's cells.
    pub fn lock_script(&self) -> Script {
        Script::new(
            SECP256K1_BLAKE160_CODE_HASH,
            ScriptHashType::Type,
            self.lock_args.to_vec(),
        )
    }

    /// Signs a 32-byte sighash message.
    ///
    /// Returns `r ‖ s ‖ recovery_id`. Nonces follow RFC 6979, so the output
    /// depends only on the key and the message.
    pub fn sign_message(&self, message: &B256) -> Result<[u8; SIGNATURE_SIZE], SignerError> {
        let (signature, recovery_id) = self.key.sign_prehash_recoverable(message.as_slice())?;

        let mut out = [0u8; SIGNATURE_SIZE];
        out[..SIGNATURE_SIZE - 1].copy_from_slice(&signature.to_bytes());
        out[SIGNATURE_SIZE - 1] = recovery_id.to_byte();
        Ok(out)
    }
}

impl FromStr for Secp256k1Signer {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1Signer")
            .field("lock_args", &hex::encode_prefixed(self.lock_args))
            .finish_non_exhaustive()
    }
}

/// Recovers the lock args of the key that produced `signature` over `message`.
pub fn recover_lock_args(
    message: &B256,
    signature: &[u8; SIGNATURE_SIZE],
) -> Result<[u8; BLAKE160_SIZE], SignerError> {
    let rs = Signature::from_slice(&signature[..SIGNATURE_SIZE - 1])?;
    let recovery_id = RecoveryId::from_byte(signature[SIGNATURE_SIZE - 1])
        .ok_or_else(k256::ecdsa::Error::new)?;
    let key = VerifyingKey::recover_from_prehash(message.as_slice(), &rs, recovery_id)?;
    Ok(blake160(&compressed_public_key(&key)))
}

fn compressed_public_key(key: &VerifyingKey) -> [u8; PUBLIC_KEY_SIZE] {
    let point = key.as_affine().to_encoded_point(true);
    let mut out = [0u8; PUBLIC_KEY_SIZE];
    out.copy_from_slice(point.as_bytes());
    out
}
