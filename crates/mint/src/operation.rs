//! Operations on spores.

use spore_primitives::bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::InputError;

/// An operation requested by the user.
///
/// Only [`Operation::Mint`] is implemented. Transferring and melting a
/// segmented spore also have to move or destroy every bound segment cell.
/// Their arguments are kept as given and are not parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Mint a file as a segmented spore.
    Mint {
        /// The file to mint.
        path: PathBuf,
    },
    /// Move a spore to a new owner.
    Transfer {
        /// The spore to move.
        spore_id: String,
        /// The new owner's address.
        to: String,
    },
    /// Destroy a spore and reclaim its capacity.
    Melt {
        /// The spore to destroy.
        spore_id: String,
    },
}

impl Operation {
    /// The operation's command name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Melt { .. } => "melt",
        }
    }

    /// Fails unless the operation is implemented.
    pub fn ensure_supported(&self) -> Result<(), InputError> {
        match self {
            Self::Mint { .. } => Ok(()),
            Self::Transfer { .. } | Self::Melt { .. } => {
                Err(InputError::UnsupportedOperation(self.name()))
            }
        }
    }
}

/// Reads the file to mint.
pub fn read_asset(path: impl AsRef<Path>) -> Result<Bytes, InputError> {
    let path = path.as_ref();
    std::fs::read(path)
        .map(Bytes::from)
        .map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })
}
