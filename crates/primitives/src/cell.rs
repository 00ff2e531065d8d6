//! Cells
//!
//! A cell is the ledger's unit of state: reserved capacity, a lock script,
//! an optional type script and a data payload. This module also carries the
//! fixed-size references transactions use to point at cells (`OutPoint`,
//! `CellInput`, `CellDep`).
//!
//! ## Occupied capacity
//!
//! A cell must reserve one CKB per byte of its contents:
//!
//! ```text
//! capacity field (8) + lock (32 + 1 + args) + type (32 + 1 + args)? + data
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use spore_primitives::{Capacity, Cell, CellOutput, Script, ScriptHashType};
//! use alloy_primitives::B256;
//!
//! let lock = Script::new(B256::ZERO, ScriptHashType::Type, vec![0u8; 20]);
//! let cell = Cell::new(CellOutput::new(Capacity::ZERO, lock, None), vec![]).with_occupied_capacity().unwrap();
//! assert_eq!(cell.capacity(), Capacity::ckb(61).unwrap());
//! ```

use alloy_primitives::B256;
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use std::fmt;

use crate::capacity::{Capacity, CapacityError};
use crate::hash::HASH_SIZE;
use crate::molecule::{self, MoleculeError};
use crate::script::{self, Script};

/// Bytes the capacity field itself occupies.
pub const CAPACITY_FIELD_SIZE: usize = 8;

/// Serialized size of an [`OutPoint`].
pub const OUT_POINT_SIZE: usize = HASH_SIZE + 4;

/// Serialized size of a [`CellInput`].
pub const CELL_INPUT_SIZE: usize = 8 + OUT_POINT_SIZE;

/// Serialized size of a [`CellDep`].
pub const CELL_DEP_SIZE: usize = OUT_POINT_SIZE + 1;

/// A reference to a cell created by a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutPoint {
    /// Hash of the creating transaction.
    pub tx_hash: B256,
    /// Output index within that transaction.
    pub index: u32,
}

impl OutPoint {
    /// Create an out point.
    #[inline]
    pub const fn new(tx_hash: B256, index: u32) -> Self {
        Self { tx_hash, index }
    }

    /// Molecule serialization (a 36-byte struct).
    pub fn serialize(&self) -> [u8; OUT_POINT_SIZE] {
        let mut out = [0u8; OUT_POINT_SIZE];
        out[..HASH_SIZE].copy_from_slice(self.tx_hash.as_slice());
        LittleEndian::write_u32(&mut out[HASH_SIZE..], self.index);
        out
    }

    /// Decode a serialized out point.
    pub fn deserialize(data: &[u8]) -> Result<Self, MoleculeError> {
        if data.len() != OUT_POINT_SIZE {
            return Err(MoleculeError::ItemSize {
                expected: OUT_POINT_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self {
            tx_hash: B256::from_slice(&data[..HASH_SIZE]),
            index: LittleEndian::read_u32(&data[HASH_SIZE..]),
        })
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// A transaction input: the cell being consumed and its `since` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellInput {
    /// Relative or absolute lock time; zero for none.
    pub since: u64,
    /// The consumed cell.
    pub previous_output: OutPoint,
}

impl CellInput {
    /// An input with no `since` constraint.
    #[inline]
    pub const fn new(previous_output: OutPoint) -> Self {
        Self {
            since: 0,
            previous_output,
        }
    }

    /// Molecule serialization (a 44-byte struct).
    pub fn serialize(&self) -> [u8; CELL_INPUT_SIZE] {
        let mut out = [0u8; CELL_INPUT_SIZE];
        LittleEndian::write_u64(&mut out[..8], self.since);
        out[8..].copy_from_slice(&self.previous_output.serialize());
        out
    }
}

/// How a cell dependency is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum DepType {
    /// The referenced cell's data is script code.
    #[default]
    Code = 0,
    /// The referenced cell's data is a list of out points to load.
    DepGroup = 1,
}

impl DepType {
    /// Returns the string form used by node RPCs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::DepGroup => "dep_group",
        }
    }
}

impl TryFrom<u8> for DepType {
    type Error = MoleculeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Code),
            1 => Ok(Self::DepGroup),
            _ => Err(MoleculeError::InvalidEnumValue(value)),
        }
    }
}

/// A reference to code or state a transaction's scripts need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellDep {
    /// The dependency cell.
    pub out_point: OutPoint,
    /// How to load it.
    pub dep_type: DepType,
}

impl CellDep {
    /// Create a cell dependency.
    #[inline]
    pub const fn new(out_point: OutPoint, dep_type: DepType) -> Self {
        Self {
            out_point,
            dep_type,
        }
    }

    /// Molecule serialization (a 37-byte struct).
    pub fn serialize(&self) -> [u8; CELL_DEP_SIZE] {
        let mut out = [0u8; CELL_DEP_SIZE];
        out[..OUT_POINT_SIZE].copy_from_slice(&self.out_point.serialize());
        out[OUT_POINT_SIZE] = self.dep_type as u8;
        out
    }
}

/// The non-data part of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellOutput {
    capacity: Capacity,
    lock: Script,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    type_: Option<Script>,
}

impl CellOutput {
    /// Create a cell output.
    pub const fn new(capacity: Capacity, lock: Script, type_: Option<Script>) -> Self {
        Self {
            capacity,
            lock,
            type_,
        }
    }

    /// Reserved capacity.
    #[inline]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Lock script.
    #[inline]
    pub const fn lock(&self) -> &Script {
        &self.lock
    }

    /// Type script, if any.
    #[inline]
    pub const fn type_(&self) -> Option<&Script> {
        self.type_.as_ref()
    }

    /// Replace the reserved capacity.
    #[inline]
    pub fn set_capacity(&mut self, capacity: Capacity) {
        self.capacity = capacity;
    }

    /// Replace the type script.
    #[inline]
    pub fn set_type(&mut self, type_: Option<Script>) {
        self.type_ = type_;
    }

    /// Bytes occupied by the output fields, excluding data.
    pub fn occupied_bytes(&self) -> usize {
        CAPACITY_FIELD_SIZE
            + self.lock.occupied_bytes()
            + self.type_.as_ref().map_or(0, Script::occupied_bytes)
    }

    /// Molecule serialization.
    pub fn serialize(&self) -> Bytes {
        let mut capacity = [0u8; 8];
        LittleEndian::write_u64(&mut capacity, self.capacity.as_u64());
        molecule::table(&[
            &capacity[..],
            self.lock.serialize().as_ref(),
            script::serialize_opt(self.type_.as_ref()).as_ref(),
        ])
    }

    /// Length of the molecule serialization.
    pub fn serialized_size(&self) -> usize {
        molecule::table_size(&[
            CAPACITY_FIELD_SIZE,
            self.lock.serialized_size(),
            self.type_.as_ref().map_or(0, Script::serialized_size),
        ])
    }
}

/// A complete cell: output fields plus data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    output: CellOutput,
    data: Bytes,
}

impl Cell {
    /// Create a cell.
    pub fn new(output: CellOutput, data: impl Into<Bytes>) -> Self {
        Self {
            output,
            data: data.into(),
        }
    }

    /// The output fields.
    #[inline]
    pub const fn output(&self) -> &CellOutput {
        &self.output
    }

    /// Mutable output fields.
    #[inline]
    pub const fn output_mut(&mut self) -> &mut CellOutput {
        &mut self.output
    }

    /// The data payload.
    #[inline]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Reserved capacity.
    #[inline]
    pub const fn capacity(&self) -> Capacity {
        self.output.capacity
    }

    /// Lock script.
    #[inline]
    pub const fn lock(&self) -> &Script {
        &self.output.lock
    }

    /// Type script, if any.
    #[inline]
    pub const fn type_(&self) -> Option<&Script> {
        self.output.type_.as_ref()
    }

    /// Bytes this cell occupies on the ledger.
    pub fn occupied_bytes(&self) -> usize {
        self.output.occupied_bytes() + self.data.len()
    }

    /// Minimum capacity this cell must reserve.
    pub fn occupied_capacity(&self) -> Result<Capacity, CapacityError> {
        Capacity::bytes(self.occupied_bytes())
    }

    /// Whether the reserved capacity covers the occupied capacity.
    pub fn is_capacity_sufficient(&self) -> Result<bool, CapacityError> {
        Ok(self.capacity() >= self.occupied_capacity()?)
    }

    /// Fails unless the reserved capacity covers the occupied capacity.
    pub fn ensure_capacity(&self) -> Result<(), CapacityError> {
        let occupied = self.occupied_capacity()?;
        if self.capacity() < occupied {
            return Err(CapacityError::Insufficient {
                capacity: self.capacity(),
                occupied,
            });
        }
        Ok(())
    }

    /// Returns the cell with capacity set to exactly its occupied capacity.
    pub fn with_occupied_capacity(mut self) -> Result<Self, CapacityError> {
        let occupied = self.occupied_capacity()?;
        self.output.capacity = occupied;
        Ok(self)
    }

    /// True for a cell holding only capacity: no type script and no data.
    #[inline]
    pub fn is_plain(&self) -> bool {
        self.output.type_.is_none() && self.data.is_empty()
    }
}

/// A cell that exists on the ledger and can be consumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiveCell {
    /// Where the cell lives.
    pub out_point: OutPoint,
    /// The cell itself.
    pub cell: Cell,
}

impl LiveCell {
    /// Create a live cell.
    pub const fn new(out_point: OutPoint, cell: Cell) -> Self {
        Self { out_point, cell }
    }

    /// The input that consumes this cell.
    #[inline]
    pub const fn as_input(&self) -> CellInput {
        CellInput::new(self.out_point)
    }
}
