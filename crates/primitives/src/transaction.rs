//! Transactions
//!
//! [`RawTransaction`] is the signed-over part of a transaction; its hash is
//! the transaction hash. [`Transaction`] adds the witnesses and is immutable
//! once built, so its hash is computed at most once.
//!
//! The fee a transaction pays is charged on [`Transaction::serialized_size_in_block`],
//! the molecule size plus the 4-byte offset the block's transaction vector
//! spends on it.

use alloy_primitives::B256;
use bytes::Bytes;

use crate::cache::OnceCache;
use crate::capacity::{Capacity, CapacityError};
use crate::cell::{Cell, CellDep, CellInput, CellOutput};
use crate::hash::ckb_hash;
use crate::molecule::{self, MoleculeError};

/// Size of a secp256k1 recoverable signature stored in a witness lock.
pub const SIGNATURE_SIZE: usize = 65;

/// Extra bytes a transaction occupies inside a block beyond its own encoding.
pub const BLOCK_TX_OFFSET_SIZE: usize = molecule::NUMBER_SIZE;

/// The part of a transaction covered by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTransaction {
    /// Transaction format version.
    pub version: u32,
    /// Code and state the scripts need, in resolution order.
    pub cell_deps: Vec<CellDep>,
    /// Block headers the scripts may read.
    pub header_deps: Vec<B256>,
    /// Consumed cells.
    pub inputs: Vec<CellInput>,
    /// Created cells.
    pub outputs: Vec<CellOutput>,
    /// Data of created cells, parallel to `outputs`.
    pub outputs_data: Vec<Bytes>,
}

impl RawTransaction {
    /// Molecule serialization.
    pub fn serialize(&self) -> Bytes {
        let outputs: Vec<Bytes> = self.outputs.iter().map(CellOutput::serialize).collect();
        let outputs_data: Vec<Bytes> = self
            .outputs_data
            .iter()
            .map(|data| molecule::bytes(data))
            .collect();
        let cell_deps: Vec<_> = self.cell_deps.iter().map(CellDep::serialize).collect();
        let inputs: Vec<_> = self.inputs.iter().map(CellInput::serialize).collect();
        let header_deps: Vec<&[u8]> = self.header_deps.iter().map(|h| h.as_slice()).collect();

        molecule::table(&[
            Bytes::copy_from_slice(&self.version.to_le_bytes()),
            molecule::fixvec(&cell_deps),
            molecule::fixvec(&header_deps),
            molecule::fixvec(&inputs),
            molecule::dynvec(&outputs),
            molecule::dynvec(&outputs_data),
        ])
    }

    /// The transaction hash.
    pub fn hash(&self) -> B256 {
        ckb_hash(&self.serialize())
    }

    /// Attach outputs as full cells.
    pub fn push_cell(&mut self, cell: &Cell) {
        self.outputs.push(cell.output().clone());
        self.outputs_data.push(cell.data().clone());
    }

    /// Sum of output capacities.
    pub fn outputs_capacity(&self) -> Result<Capacity, CapacityError> {
        Capacity::checked_sum(self.outputs.iter().map(CellOutput::capacity))
    }
}

/// A complete transaction. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Transaction {
    raw: RawTransaction,
    witnesses: Vec<Bytes>,
    hash_cache: OnceCache<B256>,
}

impl Transaction {
    /// Seal a raw transaction with its witnesses.
    pub fn new(raw: RawTransaction, witnesses: Vec<Bytes>) -> Self {
        Self {
            raw,
            witnesses,
            hash_cache: OnceCache::new(),
        }
    }

    /// The raw transaction.
    #[inline]
    pub const fn raw(&self) -> &RawTransaction {
        &self.raw
    }

    /// The witnesses.
    #[inline]
    pub fn witnesses(&self) -> &[Bytes] {
        &self.witnesses
    }

    /// The transaction hash (hash of the raw part).
    pub fn hash(&self) -> B256 {
        *self.hash_cache.get_or_compute(|| self.raw.hash())
    }

    /// Molecule serialization.
    pub fn serialize(&self) -> Bytes {
        let witnesses: Vec<Bytes> = self.witnesses.iter().map(|w| molecule::bytes(w)).collect();
        molecule::table(&[self.raw.serialize(), molecule::dynvec(&witnesses)])
    }

    /// Bytes this transaction occupies in a block; the basis for fees.
    pub fn serialized_size_in_block(&self) -> usize {
        self.serialize().len() + BLOCK_TX_OFFSET_SIZE
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.witnesses == other.witnesses
    }
}

impl Eq for Transaction {}

/// The structured witness used by lock and type scripts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WitnessArgs {
    /// Data for the lock script, usually a signature.
    pub lock: Option<Bytes>,
    /// Data for input type scripts.
    pub input_type: Option<Bytes>,
    /// Data for output type scripts.
    pub output_type: Option<Bytes>,
}

impl WitnessArgs {
    /// A witness whose lock is a zeroed signature-sized placeholder.
    ///
    /// Used both to size transactions before signing and as the exact value
    /// the sighash message is computed over.
    pub fn placeholder() -> Self {
        Self {
            lock: Some(Bytes::from_static(&[0u8; SIGNATURE_SIZE])),
            ..Default::default()
        }
    }

    /// A witness carrying the given signature in its lock field.
    pub fn with_signature(signature: [u8; SIGNATURE_SIZE]) -> Self {
        Self {
            lock: Some(Bytes::copy_from_slice(&signature)),
            ..Default::default()
        }
    }

    /// Molecule serialization.
    pub fn serialize(&self) -> Bytes {
        let field = |value: &Option<Bytes>| {
            let encoded = value.as_ref().map(|b| molecule::bytes(b));
            molecule::option(encoded.as_deref())
        };
        molecule::table(&[
            field(&self.lock),
            field(&self.input_type),
            field(&self.output_type),
        ])
    }

    /// Decode a serialized witness.
    pub fn deserialize(data: &[u8]) -> Result<Self, MoleculeError> {
        let fields = molecule::read_table(data, 3)?;
        let field = |raw: &[u8]| -> Result<Option<Bytes>, MoleculeError> {
            if raw.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Bytes::copy_from_slice(molecule::read_bytes(raw)?)))
            }
        };
        Ok(Self {
            lock: field(fields[0])?,
            input_type: field(fields[1])?,
            output_type: field(fields[2])?,
        })
    }
}
