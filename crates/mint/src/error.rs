//! Error types for minting.
//!
//! Errors are grouped by the step that produced them. Only
//! [`MintError::Submission`] is worth retrying with the same transaction;
//! every other kind means the run cannot continue without a change of input,
//! funds or configuration.

use alloy_primitives::B256;
use spore_primitives::{Capacity, CapacityError, OutPoint, SegmentError, SporeError};
use std::path::PathBuf;
use thiserror::Error;

use crate::orchestrator::MintProgress;
use crate::provider::TxStatus;

/// A boxed error from a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Bad arguments, files or configuration.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file cannot be split as configured.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// The root record is malformed.
    #[error(transparent)]
    Spore(#[from] SporeError),

    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The operation exists but is not implemented.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// A resume point beyond the last segment.
    #[error("cannot resume from segment {next_segment}: file has {segment_count} segments")]
    ResumeOutOfRange {
        /// Requested next segment.
        next_segment: usize,
        /// Segments in the file.
        segment_count: usize,
    },
}

/// Not enough spendable capacity.
#[derive(Debug, Error)]
pub enum FundingError {
    /// The owner's unreserved plain cells cannot cover outputs and fee.
    #[error("insufficient capacity: need {required}, have {available}")]
    InsufficientCapacity {
        /// Outputs plus fee.
        required: Capacity,
        /// Sum of usable input cells.
        available: Capacity,
    },

    /// The cell provider failed.
    #[error("failed to collect live cells")]
    Provider(#[source] BoxError),

    /// Capacity arithmetic overflowed.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// A transaction violates an assembly invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An output reserves less than it occupies.
    #[error("output {index} holds {capacity}, occupies {occupied}")]
    InsufficientCellCapacity {
        /// Output index.
        index: usize,
        /// Capacity held.
        capacity: Capacity,
        /// Capacity occupied.
        occupied: Capacity,
    },

    /// Outputs and their data are out of step.
    #[error("{outputs} outputs but {outputs_data} output data entries")]
    OutputsDataMismatch {
        /// Number of outputs.
        outputs: usize,
        /// Number of data entries.
        outputs_data: usize,
    },

    /// A script in the transaction has no dependency loading it.
    #[error("missing cell dependency {0}")]
    MissingCellDep(OutPoint),

    /// The lock dependency precedes the script dependency.
    #[error("cell dependency {script} must precede {lock}")]
    CellDepOrder {
        /// Spore or binding lifecycle dependency.
        script: OutPoint,
        /// Lock dependency.
        lock: OutPoint,
    },

    /// Outputs exceed inputs.
    #[error("outputs {outputs} exceed inputs {inputs}")]
    Unbalanced {
        /// Input capacity.
        inputs: Capacity,
        /// Output capacity.
        outputs: Capacity,
    },

    /// The fee paid is below the rate for the transaction size.
    #[error("fee {fee} below required {required}")]
    FeeTooLow {
        /// Fee paid.
        fee: Capacity,
        /// Fee required.
        required: Capacity,
    },

    /// A type id cannot be sealed into the output.
    #[error("output {index} has no type script with {expected}-byte args")]
    TypeIdSlot {
        /// Output index.
        index: usize,
        /// Length of the sealed args.
        expected: usize,
    },

    /// The transaction has no inputs to sign.
    #[error("transaction has no inputs")]
    NoInputs,

    /// An input is guarded by a lock the signer does not own.
    #[error("input {index} is locked by a foreign script")]
    ForeignLock {
        /// Input index.
        index: usize,
    },

    /// Signatures do not match the signing entries.
    #[error("expected {expected} signatures, got {actual}")]
    SignatureCount {
        /// Signing groups.
        expected: usize,
        /// Signatures supplied.
        actual: usize,
    },

    /// Capacity arithmetic overflowed.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Signing or broadcasting failed.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The signer failed.
    #[error("signing failed")]
    Signing(#[source] BoxError),

    /// The ledger client refused or could not deliver the transaction.
    #[error("failed to submit transaction {tx_hash}")]
    Client {
        /// Hash of the transaction.
        tx_hash: B256,
        /// Underlying error.
        #[source]
        source: BoxError,
    },
}

/// The ledger did not commit a submitted transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    /// The ledger rejected the transaction.
    #[error("transaction {tx_hash} rejected: {status}")]
    Rejected {
        /// Hash of the transaction.
        tx_hash: B256,
        /// The terminal status reported.
        status: TxStatus,
    },

    /// No terminal status within the configured timeout.
    #[error("transaction {tx_hash} not confirmed in time, last status: {}", describe_status(.last_status))]
    Timeout {
        /// Hash of the transaction.
        tx_hash: B256,
        /// Most recent status observed, if any.
        last_status: Option<TxStatus>,
    },
}

fn describe_status(status: &Option<TxStatus>) -> String {
    status
        .as_ref()
        .map_or_else(|| "none".to_owned(), ToString::to_string)
}

/// Any error from a mint run.
#[derive(Debug, Error)]
pub enum MintError {
    /// Bad input.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Not enough funds.
    #[error("funding error: {0}")]
    Funding(#[from] FundingError),

    /// Invariant violation while building.
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// Signing or broadcast failure.
    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// The ledger did not commit.
    #[error("confirmation error: {0}")]
    Confirmation(#[from] ConfirmationError),
}

impl MintError {
    /// Whether submitting the same transaction again may succeed.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission(_))
    }
}

impl From<SegmentError> for MintError {
    fn from(err: SegmentError) -> Self {
        Self::Input(err.into())
    }
}

impl From<SporeError> for MintError {
    fn from(err: SporeError) -> Self {
        Self::Input(err.into())
    }
}

/// A failed mint run and how far it got.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct MintFailure {
    /// What went wrong.
    #[source]
    pub error: MintError,
    /// Furthest point reached before the failure.
    pub progress: MintProgress,
}
