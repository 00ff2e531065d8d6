//! Ledger primitives for segmented spore minting
//!
//! This crate provides the fundamental types used to put a segmented asset
//! on a CKB-style cell ledger: hashing, the molecule wire encoding, scripts,
//! cells, transactions and the splitting of files into indexed segments.
//!
//! ## Key Components
//!
//! - **Hashing**: personalized BLAKE2b ([`ckb_hash`], [`CkbHasher`])
//! - **Cells**: [`Cell`], [`CellOutput`] and occupied [`Capacity`]
//! - **Transactions**: [`RawTransaction`], [`Transaction`], [`WitnessArgs`]
//! - **Segments**: deterministic [`Segmenter`] over a shared buffer
//! - **Spores**: the root record [`SporeData`] and [`type_id_args`]
//!
//! ## Usage Examples
//!
//! ```
//! use spore_primitives::{Segmenter, SporeData, ckb_hash};
//!
//! let file = vec![0u8; 250];
//! let root = SporeData::from_content_hash("video/mp4+spore", ckb_hash(&file)).unwrap();
//! assert_eq!(root.content().len(), 32);
//!
//! let segmenter = Segmenter::new(file, 100).unwrap();
//! assert_eq!(segmenter.segment_count(), 3);
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

// Re-export dependencies that are part of our public API
pub use alloy_primitives::B256;
pub use bytes;

mod cache;
pub mod capacity;
pub mod cell;
pub mod error;
pub mod hash;
pub mod molecule;
pub mod script;
pub mod segment;
pub mod spore;
pub mod transaction;

// Re-export core types
pub use capacity::{Capacity, CapacityError, ONE_CKB};
pub use cell::{Cell, CellDep, CellInput, CellOutput, DepType, LiveCell, OutPoint};
pub use error::{PrimitivesError, Result};
pub use hash::{CkbHasher, blake160, ckb_hash};
pub use molecule::MoleculeError;
pub use script::{Script, ScriptHashType};
pub use segment::{MAX_SEGMENTS, Segment, SegmentError, Segmenter, reassemble};
pub use spore::{SporeData, SporeError, type_id_args};
pub use transaction::{RawTransaction, SIGNATURE_SIZE, Transaction, WitnessArgs};
