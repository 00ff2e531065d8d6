//! Spore records
//!
//! The root asset cell carries a [`SporeData`] table in its data field and a
//! spore type script whose args are the spore id. The id follows the type-id
//! rule: the hash of the transaction's first input together with the index
//! of the output that carries the spore.
//!
//! ```text
//! SporeData table {
//!     content_type: Bytes,
//!     content:      Bytes,
//!     cluster_id:   BytesOpt,
//! }
//! ```

use alloy_primitives::B256;
use bytes::Bytes;
use thiserror::Error;

use crate::cell::CellInput;
use crate::hash::{CkbHasher, HASH_SIZE};
use crate::molecule::{self, MoleculeError};

/// Length of a spore id, the args of the spore type script.
pub const SPORE_ID_SIZE: usize = HASH_SIZE;

/// Errors from building or decoding spore records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SporeError {
    /// The content type is not a MIME-shaped ASCII string.
    #[error("invalid content type: {0:?}")]
    InvalidContentType(String),

    /// The content type bytes are not UTF-8.
    #[error("content type is not valid UTF-8")]
    NonUtf8ContentType,

    /// The cluster id has the wrong length.
    #[error("cluster id must be {expected} bytes, got {actual}")]
    ClusterIdSize {
        /// Required length.
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// Malformed molecule encoding.
    #[error(transparent)]
    Molecule(#[from] MoleculeError),
}

/// Check that a content type looks like `type/subtype[+suffix][;params]`.
pub fn validate_content_type(content_type: &str) -> Result<(), SporeError> {
    let valid = !content_type.is_empty()
        && content_type.is_ascii()
        && !content_type.chars().any(|c| c.is_ascii_control())
        && content_type
            .split_once('/')
            .is_some_and(|(main, sub)| !main.is_empty() && !sub.is_empty());

    if valid {
        Ok(())
    } else {
        Err(SporeError::InvalidContentType(content_type.to_owned()))
    }
}

/// The data stored in a spore cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SporeData {
    content_type: String,
    content: Bytes,
    cluster_id: Option<B256>,
}

impl SporeData {
    /// Create spore data.
    ///
    /// # Errors
    ///
    /// Returns [`SporeError::InvalidContentType`] if the content type is not
    /// MIME-shaped.
    pub fn new(
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
        cluster_id: Option<B256>,
    ) -> Result<Self, SporeError> {
        let content_type = content_type.into();
        validate_content_type(&content_type)?;
        Ok(Self {
            content_type,
            content: content.into(),
            cluster_id,
        })
    }

    /// A root record whose content is the 32-byte hash of the full asset.
    pub fn from_content_hash(
        content_type: impl Into<String>,
        content_hash: B256,
    ) -> Result<Self, SporeError> {
        Self::new(
            content_type,
            Bytes::copy_from_slice(content_hash.as_slice()),
            None,
        )
    }

    /// MIME content type.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Content bytes.
    #[inline]
    pub const fn content(&self) -> &Bytes {
        &self.content
    }

    /// Owning cluster, if any.
    #[inline]
    pub const fn cluster_id(&self) -> Option<B256> {
        self.cluster_id
    }

    /// Molecule serialization.
    pub fn encode(&self) -> Bytes {
        let cluster = self.cluster_id.map(|id| molecule::bytes(id.as_slice()));
        molecule::table(&[
            molecule::bytes(self.content_type.as_bytes()),
            molecule::bytes(&self.content),
            molecule::option(cluster.as_deref()),
        ])
    }

    /// Decode cell data.
    pub fn decode(data: &[u8]) -> Result<Self, SporeError> {
        let fields = molecule::read_table(data, 3)?;

        let content_type = std::str::from_utf8(molecule::read_bytes(fields[0])?)
            .map_err(|_| SporeError::NonUtf8ContentType)?;
        let content = Bytes::copy_from_slice(molecule::read_bytes(fields[1])?);
        let cluster_id = if fields[2].is_empty() {
            None
        } else {
            let id = molecule::read_bytes(fields[2])?;
            if id.len() != HASH_SIZE {
                return Err(SporeError::ClusterIdSize {
                    expected: HASH_SIZE,
                    actual: id.len(),
                });
            }
            Some(B256::from_slice(id))
        };

        Self::new(content_type, content, cluster_id)
    }
}

/// Derive the spore id (type-id args) for an output.
pub fn type_id_args(first_input: &CellInput, output_index: u64) -> B256 {
    CkbHasher::new()
        .update(&first_input.serialize())
        .update(&output_index.to_le_bytes())
        .finalize()
}
