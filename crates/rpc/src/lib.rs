//! Node and indexer JSON-RPC client.
//!
//! [`RpcClient`] implements the [`CellProvider`](spore_mint::CellProvider)
//! and [`LedgerClient`](spore_mint::LedgerClient) seams of `spore-mint`
//! against a CKB node:
//!
//! - `get_cells` on the indexer, paged by cursor, for funding cells
//! - `send_transaction` with the `passthrough` outputs validator
//! - `get_transaction` for confirmation polling
//!
//! Transport failures and 5xx responses are retried with exponential
//! backoff according to a [`RetryPolicy`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod client;
mod error;
mod retry;
pub mod types;

pub use client::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT, DUPLICATED_TRANSACTION_CODE, RpcClient};
pub use error::RpcError;
pub use retry::RetryPolicy;
