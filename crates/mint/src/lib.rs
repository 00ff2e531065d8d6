//! Segmented spore minting.
//!
//! This crate puts a file on a CKB-style cell ledger as one root spore cell
//! followed by a chain of segment cells bound to it.
//!
//! # Core Types
//!
//! - [`MintOrchestrator`]: runs the root-then-segments state machine
//! - [`Assembler`]: builds, funds and validates each transaction
//! - [`TransactionSkeleton`]: a transaction under construction
//! - [`MintConfig`]: network, fee rate, segment size and retry policy
//! - [`Operation`]: the closed set of spore operations
//!
//! # Traits
//!
//! - [`CellProvider`]: live cells to fund transactions
//! - [`LedgerClient`]: submission and status queries
//! - [`Signer`]: the wallet owning the funding cells
//!
//! # Features
//!
//! - `std` (default): Enable standard library support
//! - `local-signer` (default): Implement [`Signer`] for the local secp256k1 key
//! - `serde`: Enable serde serialization and JSON configuration files

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod assembler;
pub mod builder;
mod config;
mod confirm;
mod error;
mod fee;
mod memory;
mod operation;
mod orchestrator;
mod provider;
mod reservation;
mod skeleton;

pub use assembler::{AssembledSpore, Assembler};
#[cfg(feature = "serde")]
pub use config::MintConfigFile;
pub use config::{
    DEFAULT_CONTENT_TYPE, DEFAULT_RETRY_BACKOFF, DEFAULT_SEGMENT_SIZE, DEFAULT_SUBMIT_RETRIES,
    MintConfig,
};
pub use confirm::{ConfirmationPolicy, wait_for_confirmation};
pub use error::{
    BoxError, BuildError, ConfirmationError, FundingError, InputError, MintError, MintFailure,
    SubmissionError,
};
pub use fee::{FeeRate, calculate_fee, estimate_fee};
pub use memory::{MemoryLedger, MemoryLedgerError};
pub use operation::{Operation, read_asset};
pub use orchestrator::{
    MintContext, MintOrchestrator, MintProgress, MintReport, MintState, ResumePoint,
    SegmentOutcome, SporeOutcome,
};
pub use provider::{CellProvider, LedgerClient, Signer, TxStatus};
pub use reservation::InputReservations;
pub use skeleton::{SigningEntry, TransactionSkeleton};

// Re-export the local signer for convenience when local-signer is enabled
#[cfg(feature = "local-signer")]
pub use spore_signer::Secp256k1Signer;
