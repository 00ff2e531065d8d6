//! Mint configuration.
//!
//! A [`MintConfig`] starts from the defaults of a [`NamedNetwork`] and is
//! then overridden field by field, from a JSON file and from the command
//! line. Only the testnet ships with predefined script deployments; other
//! networks must name theirs.

use spore_networks::{Deployments, NamedNetwork};
use std::time::Duration;

use crate::confirm::ConfirmationPolicy;
use crate::error::InputError;
use crate::fee::FeeRate;

/// Default bytes per segment.
pub const DEFAULT_SEGMENT_SIZE: usize = 100;

/// Default content type of the root spore.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4+spore";

/// Default extra submission attempts.
pub const DEFAULT_SUBMIT_RETRIES: usize = 3;

/// Default delay before the first resubmission.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Everything a mint run needs besides the wallet and the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintConfig {
    /// Target network.
    pub network: NamedNetwork,
    /// Node RPC endpoint.
    pub rpc_url: String,
    /// Indexer endpoint.
    pub indexer_url: String,
    /// Fee rate in shannons per 1000 bytes.
    pub fee_rate: FeeRate,
    /// Payload bytes per segment.
    pub segment_size: usize,
    /// MIME type recorded in the root spore.
    pub content_type: String,
    /// Script deployments, if the network has none predefined.
    pub deployments: Option<Deployments>,
    /// Confirmation polling.
    pub confirmation: ConfirmationPolicy,
    /// Extra attempts after a failed submission.
    pub submit_retries: usize,
    /// Delay before the first resubmission, doubled on each retry.
    pub retry_backoff: Duration,
}

impl MintConfig {
    /// Defaults for `network`.
    pub fn for_network(network: NamedNetwork) -> Self {
        Self {
            network,
            rpc_url: network.default_rpc_url().to_owned(),
            indexer_url: network.default_indexer_url().to_owned(),
            fee_rate: FeeRate::DEFAULT,
            segment_size: DEFAULT_SEGMENT_SIZE,
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            deployments: Deployments::for_network(network),
            confirmation: ConfirmationPolicy::default(),
            submit_retries: DEFAULT_SUBMIT_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Checks the configuration, returning the deployments to use.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidConfig`] for a zero segment size, a zero
    /// fee rate, a zero confirmation timeout or missing deployments, and
    /// [`InputError::Spore`] for a malformed content type.
    pub fn validate(&self) -> Result<&Deployments, InputError> {
        if self.segment_size == 0 {
            return Err(InputError::InvalidConfig("segment size must be positive".into()));
        }
        if self.fee_rate.as_u64() == 0 {
            return Err(InputError::InvalidConfig("fee rate must be positive".into()));
        }
        if self.confirmation.timeout.is_zero() {
            return Err(InputError::InvalidConfig(
                "confirmation timeout must be positive".into(),
            ));
        }
        spore_primitives::spore::validate_content_type(&self.content_type)?;
        self.deployments.as_ref().ok_or_else(|| {
            InputError::InvalidConfig(format!(
                "no script deployments known for {}",
                self.network.as_str()
            ))
        })
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self::for_network(NamedNetwork::default())
    }
}

#[cfg(feature = "serde")]
pub use file::MintConfigFile;

#[cfg(feature = "serde")]
mod file {
    use super::*;
    use std::path::Path;

    /// A configuration file. Every field is optional.
    ///
    /// ```json
    /// {
    ///   "network": "testnet",
    ///   "fee_rate": 1500,
    ///   "segment_size": 100,
    ///   "confirmation_timeout_ms": 300000
    /// }
    /// ```
    #[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct MintConfigFile {
        /// Target network.
        pub network: Option<NamedNetwork>,
        /// Node RPC endpoint.
        pub rpc_url: Option<String>,
        /// Indexer endpoint.
        pub indexer_url: Option<String>,
        /// Fee rate in shannons per 1000 bytes.
        pub fee_rate: Option<FeeRate>,
        /// Payload bytes per segment.
        pub segment_size: Option<usize>,
        /// MIME type of the root spore.
        pub content_type: Option<String>,
        /// Script deployments.
        pub deployments: Option<Deployments>,
        /// First confirmation poll delay.
        pub poll_interval_ms: Option<u64>,
        /// Longest confirmation poll delay.
        pub max_poll_interval_ms: Option<u64>,
        /// Confirmation timeout.
        pub confirmation_timeout_ms: Option<u64>,
        /// Extra submission attempts.
        pub submit_retries: Option<usize>,
        /// First resubmission delay.
        pub retry_backoff_ms: Option<u64>,
    }

    impl MintConfigFile {
        /// Parses a JSON configuration.
        pub fn from_json(json: &str) -> Result<Self, InputError> {
            serde_json::from_str(json).map_err(|e| InputError::InvalidConfig(e.to_string()))
        }

        /// Reads and parses a JSON configuration file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
            let path = path.as_ref();
            let json = std::fs::read_to_string(path).map_err(|source| InputError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_json(&json)
        }

        /// Network defaults overridden by the values present in the file.
        pub fn into_config(self) -> MintConfig {
            let mut config = MintConfig::for_network(self.network.unwrap_or_default());
            let ms = Duration::from_millis;

            if let Some(url) = self.rpc_url {
                config.rpc_url = url;
            }
            if let Some(url) = self.indexer_url {
                config.indexer_url = url;
            }
            if let Some(rate) = self.fee_rate {
                config.fee_rate = rate;
            }
            if let Some(size) = self.segment_size {
                config.segment_size = size;
            }
            if let Some(content_type) = self.content_type {
                config.content_type = content_type;
            }
            if self.deployments.is_some() {
                config.deployments = self.deployments;
            }
            if let Some(interval) = self.poll_interval_ms {
                config.confirmation.poll_interval = ms(interval);
            }
            if let Some(interval) = self.max_poll_interval_ms {
                config.confirmation.max_poll_interval = ms(interval);
            }
            if let Some(timeout) = self.confirmation_timeout_ms {
                config.confirmation.timeout = ms(timeout);
            }
            if let Some(retries) = self.submit_retries {
                config.submit_retries = retries;
            }
            if let Some(backoff) = self.retry_backoff_ms {
                config.retry_backoff = ms(backoff);
            }
            config
        }
    }
}
