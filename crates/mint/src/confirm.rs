//! Waiting for transactions to commit.

use alloy_primitives::B256;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, warn};

use crate::error::ConfirmationError;
use crate::provider::{LedgerClient, TxStatus};

/// How often and how long to poll for a transaction's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfirmationPolicy {
    /// Delay before the second poll.
    pub poll_interval: Duration,
    /// Upper bound for the doubling delay.
    pub max_poll_interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
        }
    }
}

impl ConfirmationPolicy {
    /// The delay after `interval`: doubled, capped at `max_poll_interval`.
    pub fn next_interval(&self, interval: Duration) -> Duration {
        interval.saturating_mul(2).min(self.max_poll_interval)
    }
}

/// Polls until `tx_hash` is committed.
///
/// The delay between polls doubles up to
/// [`max_poll_interval`](ConfirmationPolicy::max_poll_interval). Client
/// errors are logged and polling continues; only a rejection or the timeout
/// ends the wait early.
///
/// # Errors
///
/// - [`ConfirmationError::Rejected`] if the ledger rejects the transaction
/// - [`ConfirmationError::Timeout`] if it is not committed in time
pub async fn wait_for_confirmation<C>(
    client: &C,
    tx_hash: B256,
    policy: &ConfirmationPolicy,
) -> Result<(), ConfirmationError>
where
    C: LedgerClient + Sync,
{
    let mut last_status = None;
    let started = Instant::now();

    let poll = async {
        let mut interval = policy.poll_interval;
        loop {
            match client.transaction_status(&tx_hash).await {
                Ok(TxStatus::Committed) => return Ok(()),
                Ok(TxStatus::Rejected(reason)) => {
                    return Err(ConfirmationError::Rejected {
                        tx_hash,
                        status: TxStatus::Rejected(reason),
                    });
                }
                Ok(status) => {
                    debug!(%tx_hash, %status, "waiting for commitment");
                    last_status = Some(status);
                }
                Err(e) => warn!(%tx_hash, error = %e, "status query failed"),
            }
            sleep(interval).await;
            interval = policy.next_interval(interval);
        }
    };

    let outcome = timeout(policy.timeout, poll).await;
    match outcome {
        Ok(result) => {
            if result.is_ok() {
                debug!(%tx_hash, elapsed = ?started.elapsed(), "transaction committed");
            }
            result
        }
        Err(_) => Err(ConfirmationError::Timeout {
            tx_hash,
            last_status,
        }),
    }
}
