//! Error types for the spore-primitives crate
//!
//! Each module has its own error enum. `PrimitivesError` wraps all of them
//! so callers that touch several modules can use a single `?` path.
//!
//! ## Example Usage
//!
//! ```
//! use spore_primitives::error::{PrimitivesError, Result};
//! use spore_primitives::segment::Segmenter;
//!
//! fn count(data: Vec<u8>) -> Result<usize> {
//!     Ok(Segmenter::new(data, 0)?.segment_count())
//! }
//!
//! assert!(matches!(count(vec![1]), Err(PrimitivesError::Segment(_))));
//! ```

use thiserror::Error;

/// Result type for operations in the primitives crate
pub type Result<T> = std::result::Result<T, PrimitivesError>;

/// Main error type for the primitives crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitivesError {
    /// Errors from molecule decoding
    #[error(transparent)]
    Molecule(#[from] crate::molecule::MoleculeError),

    /// Errors from capacity arithmetic
    #[error(transparent)]
    Capacity(#[from] crate::capacity::CapacityError),

    /// Errors from segmenting
    #[error(transparent)]
    Segment(#[from] crate::segment::SegmentError),

    /// Errors from spore records
    #[error(transparent)]
    Spore(#[from] crate::spore::SporeError),
}
