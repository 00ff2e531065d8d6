//! Script deployment information.
//!
//! Every script a mint references lives in a cell on chain. A
//! [`ScriptDeployment`] records how to name the script (`code_hash` and
//! `hash_type`) and which cell a transaction must list as a dependency to
//! load it.
//!
//! ```
//! use spore_networks::{Deployments, NamedNetwork, testnet};
//!
//! let deployments = Deployments::for_network(NamedNetwork::Testnet).unwrap();
//! assert_eq!(deployments.spore, testnet::SPORE);
//! assert!(Deployments::for_network(NamedNetwork::Mainnet).is_none());
//! ```

use alloy_primitives::{B256, b256};
use spore_primitives::bytes::Bytes;
use spore_primitives::{CellDep, Script, ScriptHashType};

use crate::NamedNetwork;

/// Type hash of the default secp256k1/blake160 lock, identical on every
/// public network.
pub const SECP256K1_BLAKE160_CODE_HASH: B256 =
    b256!("9bd7e06f3ecf4be0f2fcd2188b23f1b9fcc88e5d4b65a8637b17723bbda3cce8");

/// Where a script's code lives and how to reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptDeployment {
    /// Code hash scripts use to name this code.
    pub code_hash: B256,
    /// How `code_hash` is matched.
    pub hash_type: ScriptHashType,
    /// The dependency that loads the code.
    pub cell_dep: CellDep,
}

impl ScriptDeployment {
    /// Creates a new deployment.
    #[must_use]
    pub const fn new(code_hash: B256, hash_type: ScriptHashType, cell_dep: CellDep) -> Self {
        Self {
            code_hash,
            hash_type,
            cell_dep,
        }
    }

    /// A script running this code with the given args.
    pub fn script(&self, args: impl Into<Bytes>) -> Script {
        Script::new(self.code_hash, self.hash_type, args)
    }

    /// Whether `script` runs this code.
    #[inline]
    pub fn runs(&self, script: &Script) -> bool {
        script.code_hash() == self.code_hash && script.hash_type() == self.hash_type
    }
}

/// The scripts a segmented mint depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deployments {
    /// Default lock: secp256k1 signature over a blake160 pubkey hash.
    pub secp256k1_blake160: ScriptDeployment,
    /// Spore type script, the identity of the root asset.
    pub spore: ScriptDeployment,
    /// Binding lifecycle lock, which ties segment cells to their spore.
    pub binding_lifecycle: ScriptDeployment,
}

impl Deployments {
    /// Predefined deployments for a network.
    ///
    /// Only the testnet carries the binding lifecycle script, so other
    /// networks return `None` and must be configured explicitly.
    pub const fn for_network(network: NamedNetwork) -> Option<Self> {
        match network {
            NamedNetwork::Testnet => Some(testnet::DEPLOYMENTS),
            NamedNetwork::Mainnet | NamedNetwork::Devnet => None,
        }
    }
}

/// Pudge testnet deployments.
pub mod testnet {
    use super::*;
    use spore_primitives::{DepType, OutPoint};

    /// Default secp256k1/blake160 lock, loaded through its dep group.
    pub const SECP256K1_BLAKE160: ScriptDeployment = ScriptDeployment::new(
        SECP256K1_BLAKE160_CODE_HASH,
        ScriptHashType::Type,
        CellDep::new(
            OutPoint::new(
                b256!("f8de3bb47d055cdf460d93a2a6e1b05f7432f9777c8c474abf4eec1d4aee5d37"),
                0,
            ),
            DepType::DepGroup,
        ),
    );

    /// Spore type script.
    pub const SPORE: ScriptDeployment = ScriptDeployment::new(
        b256!("685a60219309029d01310311dba953d67029170ca4848a4ff638e57002130a0d"),
        ScriptHashType::Data1,
        CellDep::new(
            OutPoint::new(
                b256!("5e8d2a517d50fd4bb4d01737a7952a1f1d35c8afc77240695bb569cd7d9d5a1f"),
                0,
            ),
            DepType::Code,
        ),
    );

    /// Binding lifecycle lock.
    pub const BINDING_LIFECYCLE: ScriptDeployment = ScriptDeployment::new(
        b256!("20f1117a520a066fa9bf99ace508226b8706d559270c35c81403e057ccdc583d"),
        ScriptHashType::Type,
        CellDep::new(
            OutPoint::new(
                b256!("1d1dd7e545de483e098c818d61d9a6a711b7e8a028c196908daee2bbcafa34a8"),
                0,
            ),
            DepType::Code,
        ),
    );

    /// All testnet deployments.
    pub const DEPLOYMENTS: Deployments = Deployments {
        secp256k1_blake160: SECP256K1_BLAKE160,
        spore: SPORE,
        binding_lifecycle: BINDING_LIFECYCLE,
    };
}

/// Lina mainnet deployments.
///
/// Spore and binding lifecycle scripts must be supplied by configuration.
pub mod mainnet {
    use super::*;
    use spore_primitives::{DepType, OutPoint};

    /// Default secp256k1/blake160 lock, loaded through its dep group.
    pub const SECP256K1_BLAKE160: ScriptDeployment = ScriptDeployment::new(
        SECP256K1_BLAKE160_CODE_HASH,
        ScriptHashType::Type,
        CellDep::new(
            OutPoint::new(
                b256!("71a7ba8fc96349fea0ed3a5c47992e3b4084b031a42264a018e0072e8172e46c"),
                0,
            ),
            DepType::DepGroup,
        ),
    );
}
