//! RPC client errors.

use thiserror::Error;

/// Errors from node and indexer calls.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never completed.
    #[error("HTTP error calling {method}: {source}")]
    Http {
        /// JSON-RPC method.
        method: &'static str,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        /// JSON-RPC method.
        method: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The node returned a JSON-RPC error object.
    #[error("{method} failed with code {code}: {message}")]
    Rpc {
        /// JSON-RPC method.
        method: &'static str,
        /// Error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The response body did not decode.
    #[error("failed to decode {method} response: {source}")]
    Decode {
        /// JSON-RPC method.
        method: &'static str,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A successful response carried no result.
    #[error("{method} returned no result")]
    EmptyResult {
        /// JSON-RPC method.
        method: &'static str,
    },

    /// A field had an unexpected value.
    #[error("invalid {field} in {method} response: {value}")]
    InvalidField {
        /// JSON-RPC method.
        method: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// The endpoint URL is malformed.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RpcError {
    /// Whether the request failed in transport and may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { source, .. } => source.is_connect() || source.is_timeout(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
