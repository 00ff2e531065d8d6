//! Transaction skeletons.
//!
//! A [`TransactionSkeleton`] is a transaction under construction. Inputs are
//! kept as resolved [`LiveCell`]s so capacity and lock groups are known
//! without another lookup. Parts are only ever appended; the single
//! in-place edit is sealing a type id into a slot of the same length.
//!
//! ## Signing
//!
//! Inputs are grouped by lock script. For each group the sighash-all message
//! is
//!
//! ```text
//! ckb_hash(tx_hash
//!          ++ len(w0) ++ w0          first witness of the group, lock zeroed
//!          ++ len(wi) ++ wi ...      remaining witnesses of the group
//!          ++ len(wj) ++ wj ...)     witnesses beyond the input count
//! ```
//!
//! with lengths as u64 little-endian. The zeroed first witness is exactly
//! [`WitnessArgs::placeholder`], so the message is fixed before signing.

use alloy_primitives::B256;
use spore_primitives::bytes::Bytes;
use spore_primitives::{
    Capacity, CapacityError, Cell, CellDep, CkbHasher, LiveCell, RawTransaction, SIGNATURE_SIZE,
    Script, Transaction, WitnessArgs,
};

use crate::error::BuildError;

/// Inputs sharing a lock script, signed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningEntry {
    /// The lock guarding these inputs.
    pub lock: Script,
    /// Input indices in the group; the first carries the signature.
    pub input_indices: Vec<usize>,
    /// Sighash-all message to sign.
    pub message: B256,
}

/// An append-only transaction under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSkeleton {
    cell_deps: Vec<CellDep>,
    header_deps: Vec<B256>,
    inputs: Vec<LiveCell>,
    outputs: Vec<Cell>,
    signing_entries: Vec<SigningEntry>,
}

impl TransactionSkeleton {
    /// An empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell dependency.
    pub fn push_cell_dep(&mut self, dep: CellDep) -> &mut Self {
        self.signing_entries.clear();
        self.cell_deps.push(dep);
        self
    }

    /// Appends a header dependency.
    pub fn push_header_dep(&mut self, header: B256) -> &mut Self {
        self.signing_entries.clear();
        self.header_deps.push(header);
        self
    }

    /// Appends an input.
    pub fn push_input(&mut self, cell: LiveCell) -> &mut Self {
        self.signing_entries.clear();
        self.inputs.push(cell);
        self
    }

    /// Appends an output, returning its index.
    pub fn push_output(&mut self, cell: Cell) -> usize {
        self.signing_entries.clear();
        self.outputs.push(cell);
        self.outputs.len() - 1
    }

    /// Cell dependencies in order.
    #[inline]
    pub fn cell_deps(&self) -> &[CellDep] {
        &self.cell_deps
    }

    /// Header dependencies in order.
    #[inline]
    pub fn header_deps(&self) -> &[B256] {
        &self.header_deps
    }

    /// Inputs in order.
    #[inline]
    pub fn inputs(&self) -> &[LiveCell] {
        &self.inputs
    }

    /// Outputs in order.
    #[inline]
    pub fn outputs(&self) -> &[Cell] {
        &self.outputs
    }

    /// Signing entries from the last [`prepare_signing_entries`](Self::prepare_signing_entries).
    #[inline]
    pub fn signing_entries(&self) -> &[SigningEntry] {
        &self.signing_entries
    }

    /// Replaces the type args of output `index` with a same-length value.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeIdSlot`] if the output has no type script
    /// or its args differ in length, since a longer value would change the
    /// occupied capacity after funding.
    pub fn seal_type_id(&mut self, index: usize, args: B256) -> Result<(), BuildError> {
        let slot = BuildError::TypeIdSlot {
            index,
            expected: args.len(),
        };
        let output = self.outputs.get_mut(index).ok_or_else(|| slot.clone())?;
        let sealed = match output.type_() {
            Some(script) if script.args().len() == args.len() => script.with_args(args.to_vec()),
            _ => return Err(slot),
        };
        output.output_mut().set_type(Some(sealed));
        self.signing_entries.clear();
        Ok(())
    }

    /// Sum of input capacities.
    pub fn inputs_capacity(&self) -> Result<Capacity, CapacityError> {
        Capacity::checked_sum(self.inputs.iter().map(|input| input.cell.capacity()))
    }

    /// Sum of output capacities.
    pub fn outputs_capacity(&self) -> Result<Capacity, CapacityError> {
        Capacity::checked_sum(self.outputs.iter().map(Cell::capacity))
    }

    /// Inputs minus outputs: the fee this transaction pays.
    pub fn fee(&self) -> Result<Capacity, CapacityError> {
        self.inputs_capacity()?.safe_sub(self.outputs_capacity()?)
    }

    /// The raw transaction as it stands.
    pub fn to_raw(&self) -> RawTransaction {
        let mut raw = RawTransaction {
            cell_deps: self.cell_deps.clone(),
            header_deps: self.header_deps.clone(),
            inputs: self.inputs.iter().map(LiveCell::as_input).collect(),
            ..Default::default()
        };
        for output in &self.outputs {
            raw.push_cell(output);
        }
        raw
    }

    /// Block size of the transaction once signed.
    pub fn estimated_size(&self) -> usize {
        Transaction::new(self.to_raw(), self.placeholder_witnesses()).serialized_size_in_block()
    }

    /// Groups inputs by lock and computes each group's sighash message.
    pub fn prepare_signing_entries(&mut self) -> &[SigningEntry] {
        let tx_hash = self.to_raw().hash();
        let witnesses = self.placeholder_witnesses();

        let mut entries: Vec<SigningEntry> = Vec::new();
        for (index, input) in self.inputs.iter().enumerate() {
            match entries.iter_mut().find(|e| &e.lock == input.cell.lock()) {
                Some(entry) => entry.input_indices.push(index),
                None => entries.push(SigningEntry {
                    lock: input.cell.lock().clone(),
                    input_indices: vec![index],
                    message: B256::ZERO,
                }),
            }
        }

        for entry in &mut entries {
            let mut hasher = CkbHasher::new();
            hasher.update(tx_hash.as_slice());
            let group = entry.input_indices.iter().map(|&i| &witnesses[i]);
            let extra = witnesses.iter().skip(self.inputs.len());
            for witness in group.chain(extra) {
                hasher.update(&(witness.len() as u64).to_le_bytes());
                hasher.update(witness);
            }
            entry.message = hasher.finalize();
        }

        self.signing_entries = entries;
        &self.signing_entries
    }

    /// Seals the skeleton into a transaction, one signature per signing entry.
    pub fn into_transaction(
        self,
        signatures: &[[u8; SIGNATURE_SIZE]],
    ) -> Result<Transaction, BuildError> {
        if self.inputs.is_empty() {
            return Err(BuildError::NoInputs);
        }
        if self.signing_entries.is_empty() || signatures.len() != self.signing_entries.len() {
            return Err(BuildError::SignatureCount {
                expected: self.signing_entries.len(),
                actual: signatures.len(),
            });
        }

        let mut witnesses = vec![Bytes::new(); self.inputs.len()];
        for (entry, signature) in self.signing_entries.iter().zip(signatures) {
            witnesses[entry.input_indices[0]] = WitnessArgs::with_signature(*signature).serialize();
        }
        Ok(Transaction::new(self.to_raw(), witnesses))
    }

    /// Witnesses with a placeholder in the first slot of each lock group.
    fn placeholder_witnesses(&self) -> Vec<Bytes> {
        let placeholder = WitnessArgs::placeholder().serialize();
        let mut seen: Vec<&Script> = Vec::new();
        self.inputs
            .iter()
            .map(|input| {
                let lock = input.cell.lock();
                if seen.contains(&lock) {
                    Bytes::new()
                } else {
                    seen.push(lock);
                    placeholder.clone()
                }
            })
            .collect()
    }
}
