//! Collaborator traits.
//!
//! Minting talks to the outside world through three seams: a source of live
//! cells to fund transactions, a ledger client that accepts transactions and
//! reports their status, and a signer that owns the wallet key.
//!
//! # Async Design
//!
//! Ledger access goes over the network, so [`CellProvider`] and
//! [`LedgerClient`] return futures. Signing is local and synchronous.

use alloy_primitives::B256;
use core::fmt;
use spore_primitives::{LiveCell, SIGNATURE_SIZE, Script, Transaction};

/// Status of a submitted transaction as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TxStatus {
    /// In the pool, not yet proposed.
    Pending,
    /// Proposed in a block, awaiting commitment.
    Proposed,
    /// Committed on chain.
    Committed,
    /// Not known to the node.
    Unknown,
    /// Rejected, with the node's reason.
    Rejected(String),
}

impl TxStatus {
    /// Whether this status is final.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Rejected(_))
    }

    /// Whether the transaction is committed.
    #[inline]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Proposed => f.write_str("proposed"),
            Self::Committed => f.write_str("committed"),
            Self::Unknown => f.write_str("unknown"),
            Self::Rejected(reason) => write!(f, "rejected({reason})"),
        }
    }
}

/// A source of spendable cells.
pub trait CellProvider {
    /// The error type returned by the provider.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns live cells guarded by `lock` that hold only capacity.
    ///
    /// Cells with a type script or non-empty data must not be returned;
    /// they carry assets a capacity input would destroy.
    fn live_cells(
        &self,
        lock: &Script,
    ) -> impl std::future::Future<Output = Result<Vec<LiveCell>, Self::Error>> + Send;
}

/// Submission and status queries.
pub trait LedgerClient {
    /// The error type returned by the client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Broadcasts a signed transaction, returning its hash.
    fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> impl std::future::Future<Output = Result<B256, Self::Error>> + Send;

    /// Queries the status of a transaction.
    fn transaction_status(
        &self,
        tx_hash: &B256,
    ) -> impl std::future::Future<Output = Result<TxStatus, Self::Error>> + Send;
}

/// The wallet that owns the funding cells and signs for them.
pub trait Signer {
    /// The error type returned when signing fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lock script of the wallet's cells.
    fn lock_script(&self) -> Script;

    /// Signs a sighash message, returning a recoverable signature.
    fn sign_message(&self, message: &B256) -> Result<[u8; SIGNATURE_SIZE], Self::Error>;
}

#[cfg(feature = "local-signer")]
impl Signer for spore_signer::Secp256k1Signer {
    type Error = spore_signer::SignerError;

    fn lock_script(&self) -> Script {
        Self::lock_script(self)
    }

    fn sign_message(&self, message: &B256) -> Result<[u8; SIGNATURE_SIZE], Self::Error> {
        Self::sign_message(self, message)
    }
}

impl<T: CellProvider + Sync + ?Sized> CellProvider for &T {
    type Error = T::Error;

    fn live_cells(
        &self,
        lock: &Script,
    ) -> impl std::future::Future<Output = Result<Vec<LiveCell>, Self::Error>> + Send {
        (**self).live_cells(lock)
    }
}

impl<T: LedgerClient + Sync + ?Sized> LedgerClient for &T {
    type Error = T::Error;

    fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> impl std::future::Future<Output = Result<B256, Self::Error>> + Send {
        (**self).send_transaction(tx)
    }

    fn transaction_status(
        &self,
        tx_hash: &B256,
    ) -> impl std::future::Future<Output = Result<TxStatus, Self::Error>> + Send {
        (**self).transaction_status(tx_hash)
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    type Error = T::Error;

    fn lock_script(&self) -> Script {
        (**self).lock_script()
    }

    fn sign_message(&self, message: &B256) -> Result<[u8; SIGNATURE_SIZE], Self::Error> {
        (**self).sign_message(message)
    }
}
