//! Scripts
//!
//! A script names on-ledger code (`code_hash` interpreted per `hash_type`)
//! together with the arguments it runs with. Scripts act as lock scripts
//! (spending conditions) and type scripts (identity and semantics). The hash
//! of a serialized script is its *type hash* when used as a type script.

use alloy_primitives::{B256, hex};
use bytes::Bytes;
use std::fmt;

use crate::hash::{HASH_SIZE, ckb_hash};
use crate::molecule::{self, MoleculeError};

/// How a script's `code_hash` locates its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ScriptHashType {
    /// Match the data hash of a cell, first VM version.
    #[default]
    Data = 0,
    /// Match the type hash of a cell.
    Type = 1,
    /// Match the data hash of a cell, VM version 1.
    Data1 = 2,
    /// Match the data hash of a cell, VM version 2.
    Data2 = 4,
}

impl ScriptHashType {
    /// The molecule byte for this hash type.
    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns the string form used by node RPCs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Type => "type",
            Self::Data1 => "data1",
            Self::Data2 => "data2",
        }
    }
}

impl TryFrom<u8> for ScriptHashType {
    type Error = MoleculeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Data),
            1 => Ok(Self::Type),
            2 => Ok(Self::Data1),
            4 => Ok(Self::Data2),
            _ => Err(MoleculeError::InvalidEnumValue(value)),
        }
    }
}

impl std::str::FromStr for ScriptHashType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(Self::Data),
            "type" => Ok(Self::Type),
            "data1" => Ok(Self::Data1),
            "data2" => Ok(Self::Data2),
            other => Err(format!("unknown script hash type: {other}")),
        }
    }
}

impl fmt::Display for ScriptHashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lock or type script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    code_hash: B256,
    hash_type: ScriptHashType,
    args: Bytes,
}

impl Script {
    /// Create a script.
    pub fn new(code_hash: B256, hash_type: ScriptHashType, args: impl Into<Bytes>) -> Self {
        Self {
            code_hash,
            hash_type,
            args: args.into(),
        }
    }

    /// The code hash.
    #[inline]
    pub const fn code_hash(&self) -> B256 {
        self.code_hash
    }

    /// The hash type.
    #[inline]
    pub const fn hash_type(&self) -> ScriptHashType {
        self.hash_type
    }

    /// The script arguments.
    #[inline]
    pub const fn args(&self) -> &Bytes {
        &self.args
    }

    /// Returns a copy of this script with different arguments.
    pub fn with_args(&self, args: impl Into<Bytes>) -> Self {
        Self::new(self.code_hash, self.hash_type, args)
    }

    /// Bytes this script contributes to a cell's occupied capacity.
    ///
    /// `code_hash (32) + hash_type (1) + args`
    #[inline]
    pub fn occupied_bytes(&self) -> usize {
        HASH_SIZE + 1 + self.args.len()
    }

    /// Molecule serialization.
    pub fn serialize(&self) -> Bytes {
        molecule::table(&[
            self.code_hash.as_slice(),
            &[self.hash_type.as_byte()],
            molecule::bytes(&self.args).as_ref(),
        ])
    }

    /// Length of the molecule serialization.
    #[inline]
    pub fn serialized_size(&self) -> usize {
        molecule::table_size(&[HASH_SIZE, 1, molecule::NUMBER_SIZE + self.args.len()])
    }

    /// Hash of the serialized script.
    ///
    /// For a type script this is the type hash that other cells use to
    /// reference the cell carrying it.
    pub fn hash(&self) -> B256 {
        ckb_hash(&self.serialize())
    }

    /// Decode a molecule-serialized script.
    pub fn deserialize(data: &[u8]) -> Result<Self, MoleculeError> {
        let fields = molecule::read_table(data, 3)?;
        if fields[0].len() != HASH_SIZE {
            return Err(MoleculeError::ItemSize {
                expected: HASH_SIZE,
                actual: fields[0].len(),
            });
        }
        if fields[1].len() != 1 {
            return Err(MoleculeError::ItemSize {
                expected: 1,
                actual: fields[1].len(),
            });
        }
        let args = molecule::read_bytes(fields[2])?;
        Ok(Self {
            code_hash: B256::from_slice(fields[0]),
            hash_type: ScriptHashType::try_from(fields[1][0])?,
            args: Bytes::copy_from_slice(args),
        })
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Script[{}:{}:0x{}]",
            self.code_hash,
            self.hash_type,
            hex::encode(&self.args)
        )
    }
}

/// Molecule serialization of an optional script (`ScriptOpt`).
pub fn serialize_opt(script: Option<&Script>) -> Bytes {
    script.map(Script::serialize).unwrap_or_default()
}
