//! Canonical definitions of CKB networks and the scripts spores depend on.
//!
//! [`NamedNetwork`] identifies a network and carries its public endpoints.
//! [`Deployments`] bundles the on-chain location of every script a segmented
//! mint references.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support
//! - `serde`: Enable serde serialization/deserialization

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod deployment;
mod named;

pub use deployment::{
    Deployments, SECP256K1_BLAKE160_CODE_HASH, ScriptDeployment, mainnet, testnet,
};
pub use named::NamedNetwork;
