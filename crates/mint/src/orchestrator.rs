//! The mint state machine.
//!
//! A run walks through
//!
//! ```text
//! Idle -> RootSubmitted -> RootConfirmed
//!      -> SegmentSubmitted(0) -> SegmentConfirmed(0)
//!      -> ...
//!      -> SegmentSubmitted(n-1) -> SegmentConfirmed(n-1) -> Done
//! ```
//!
//! and may fall into `Failed` from any step. Segments are minted one at a
//! time: segment `i` is built only after segment `i - 1` is committed, and
//! the root's type hash is used only after the root is committed.
//!
//! Nothing is rolled back on failure. The root and every confirmed segment
//! stay on chain, and [`MintFailure::progress`] says where to resume.

use alloy_primitives::B256;
use core::fmt;
use spore_networks::NamedNetwork;
use spore_primitives::bytes::Bytes;
use spore_primitives::{Segmenter, SporeData, ckb_hash};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::assembler::Assembler;
use crate::config::MintConfig;
use crate::confirm::wait_for_confirmation;
use crate::error::{ConfirmationError, InputError, MintError, MintFailure, SubmissionError};
use crate::provider::{CellProvider, LedgerClient, Signer};
use crate::skeleton::TransactionSkeleton;

/// The collaborators of a mint run.
#[derive(Debug, Clone)]
pub struct MintContext<C, S> {
    /// Cell source and ledger.
    pub client: C,
    /// The wallet paying for and owning the spore.
    pub signer: S,
    /// Run parameters.
    pub config: MintConfig,
}

/// Where a run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MintState {
    /// Nothing submitted yet.
    Idle,
    /// Root transaction broadcast.
    RootSubmitted {
        /// Root transaction hash.
        tx_hash: B256,
    },
    /// Root transaction committed.
    RootConfirmed {
        /// Hash of the spore type script.
        type_hash: B256,
    },
    /// Segment transaction broadcast.
    SegmentSubmitted {
        /// Segment index.
        index: usize,
        /// Segment transaction hash.
        tx_hash: B256,
    },
    /// Segment transaction committed.
    SegmentConfirmed {
        /// Segment index.
        index: usize,
    },
    /// Every segment committed.
    Done,
    /// The run stopped on an error.
    Failed,
}

impl fmt::Display for MintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::RootSubmitted { tx_hash } => write!(f, "root submitted ({tx_hash})"),
            Self::RootConfirmed { type_hash } => write!(f, "root confirmed ({type_hash})"),
            Self::SegmentSubmitted { index, tx_hash } => {
                write!(f, "segment {index} submitted ({tx_hash})")
            }
            Self::SegmentConfirmed { index } => write!(f, "segment {index} confirmed"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintProgress {
    /// Type hash of the root spore, once committed.
    pub spore_type_hash: Option<B256>,
    /// First segment not yet committed.
    pub next_segment: usize,
    /// Segments in the file.
    pub segment_count: usize,
    /// The root, once broadcast and until committed or rejected.
    pub pending_root: Option<SporeOutcome>,
    /// The segment in flight, once broadcast and until committed or rejected.
    pub pending_segment: Option<SegmentOutcome>,
    /// Last state reached.
    pub state: MintState,
}

impl MintProgress {
    const fn new(segment_count: usize) -> Self {
        Self {
            spore_type_hash: None,
            next_segment: 0,
            segment_count,
            pending_root: None,
            pending_segment: None,
            state: MintState::Idle,
        }
    }

    /// Where to pick up, if the root is committed.
    ///
    /// A root or segment in [`pending_root`](Self::pending_root) or
    /// [`pending_segment`](Self::pending_segment) may still commit after the
    /// run stopped; the resume point does not count it.
    pub fn resume_point(&self) -> Option<ResumePoint> {
        self.spore_type_hash.map(|spore_type_hash| ResumePoint {
            spore_type_hash,
            next_segment: self.next_segment,
        })
    }
}

/// A committed root and the first segment still to mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// Type hash of the committed root spore.
    pub spore_type_hash: B256,
    /// First segment to mint.
    pub next_segment: usize,
}

/// The committed root transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SporeOutcome {
    /// Root transaction hash.
    pub tx_hash: B256,
    /// Spore id.
    pub spore_id: B256,
    /// Hash of the spore type script.
    pub type_hash: B256,
}

/// A committed segment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOutcome {
    /// Segment index.
    pub index: usize,
    /// Segment transaction hash.
    pub tx_hash: B256,
}

/// The result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReport {
    /// Network minted on.
    pub network: NamedNetwork,
    /// Type hash the segments are bound to.
    pub spore_type_hash: B256,
    /// The root, unless the run was resumed.
    pub spore: Option<SporeOutcome>,
    /// Segments committed in this run.
    pub segments: Vec<SegmentOutcome>,
}

/// Drives one mint from file bytes to committed cells.
#[derive(Debug)]
pub struct MintOrchestrator<C, S> {
    context: MintContext<C, S>,
    assembler: Assembler,
    state: watch::Sender<MintState>,
}

impl<C, S> MintOrchestrator<C, S>
where
    C: CellProvider + LedgerClient + Sync,
    S: Signer + Sync,
{
    /// Creates an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the configuration does not validate.
    pub fn new(context: MintContext<C, S>) -> Result<Self, InputError> {
        let deployments = *context.config.validate()?;
        let assembler = Assembler::new(deployments, context.config.fee_rate);
        let (state, _) = watch::channel(MintState::Idle);
        Ok(Self {
            context,
            assembler,
            state,
        })
    }

    /// The run's collaborators.
    pub const fn context(&self) -> &MintContext<C, S> {
        &self.context
    }

    /// The current state.
    pub fn state(&self) -> MintState {
        *self.state.borrow()
    }

    /// Watches state transitions.
    pub fn subscribe(&self) -> watch::Receiver<MintState> {
        self.state.subscribe()
    }

    /// Mints `file` as a root spore followed by its segments.
    pub async fn mint(&self, file: Bytes) -> Result<MintReport, MintFailure> {
        self.execute(file, None).await
    }

    /// Mints the segments of `file` from `resume.next_segment` on, bound to
    /// an already committed root.
    pub async fn resume(&self, file: Bytes, resume: ResumePoint) -> Result<MintReport, MintFailure> {
        self.execute(file, Some(resume)).await
    }

    async fn execute(
        &self,
        file: Bytes,
        resume: Option<ResumePoint>,
    ) -> Result<MintReport, MintFailure> {
        let mut progress = MintProgress::new(0);
        match self.run(file, resume, &mut progress).await {
            Ok(report) => Ok(report),
            Err(error) => {
                error!(%error, state = %progress.state, "mint failed");
                self.state.send_replace(MintState::Failed);
                Err(MintFailure { error, progress })
            }
        }
    }

    async fn run(
        &self,
        file: Bytes,
        resume: Option<ResumePoint>,
        progress: &mut MintProgress,
    ) -> Result<MintReport, MintError> {
        let config = &self.context.config;
        let segmenter = Segmenter::new(file, config.segment_size)?;
        *progress = MintProgress::new(segmenter.segment_count());
        self.transition(progress, MintState::Idle);

        let (spore, spore_type_hash, first_segment) = match resume {
            Some(point) => {
                if point.next_segment > segmenter.segment_count() {
                    return Err(InputError::ResumeOutOfRange {
                        next_segment: point.next_segment,
                        segment_count: segmenter.segment_count(),
                    }
                    .into());
                }
                info!(
                    spore_type_hash = %point.spore_type_hash,
                    next_segment = point.next_segment,
                    "resuming mint"
                );
                (None, point.spore_type_hash, point.next_segment)
            }
            None => {
                let spore = self.mint_root(&segmenter, progress).await?;
                (Some(spore), spore.type_hash, 0)
            }
        };

        progress.spore_type_hash = Some(spore_type_hash);
        progress.next_segment = first_segment;
        self.transition(
            progress,
            MintState::RootConfirmed {
                type_hash: spore_type_hash,
            },
        );

        let owner = self.context.signer.lock_script();
        let mut segments = Vec::with_capacity(segmenter.segment_count() - first_segment);
        for segment in segmenter.iter().skip(first_segment) {
            let index = usize::from(segment.index());
            let skeleton = self
                .assembler
                .assemble_segment(&self.context.client, &owner, spore_type_hash, &segment)
                .await?;

            let tx_hash = self.submit(&skeleton).await?;
            let outcome = SegmentOutcome { index, tx_hash };
            progress.pending_segment = Some(outcome);
            self.transition(progress, MintState::SegmentSubmitted { index, tx_hash });

            self.confirm(tx_hash, progress).await?;
            progress.pending_segment = None;
            progress.next_segment = index + 1;
            self.transition(progress, MintState::SegmentConfirmed { index });
            segments.push(outcome);
        }

        self.transition(progress, MintState::Done);
        Ok(MintReport {
            network: config.network,
            spore_type_hash,
            spore,
            segments,
        })
    }

    async fn mint_root(
        &self,
        segmenter: &Segmenter,
        progress: &mut MintProgress,
    ) -> Result<SporeOutcome, MintError> {
        let config = &self.context.config;
        let data = SporeData::from_content_hash(
            config.content_type.as_str(),
            ckb_hash(segmenter.buffer()),
        )?;

        let owner = self.context.signer.lock_script();
        let assembled = self
            .assembler
            .assemble_spore(&self.context.client, &owner, &data)
            .await?;

        let tx_hash = self.submit(&assembled.skeleton).await?;
        let spore = SporeOutcome {
            tx_hash,
            spore_id: assembled.spore_id,
            type_hash: assembled.type_hash,
        };
        progress.pending_root = Some(spore);
        self.transition(progress, MintState::RootSubmitted { tx_hash });

        self.confirm(tx_hash, progress).await?;
        progress.pending_root = None;
        Ok(spore)
    }

    /// Waits for `tx_hash`. A rejected transaction is no longer pending.
    async fn confirm(&self, tx_hash: B256, progress: &mut MintProgress) -> Result<(), MintError> {
        let config = &self.context.config;
        match wait_for_confirmation(&self.context.client, tx_hash, &config.confirmation).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if matches!(e, ConfirmationError::Rejected { .. }) {
                    progress.pending_root = None;
                    progress.pending_segment = None;
                }
                Err(e.into())
            }
        }
    }

    /// Signs and broadcasts, retrying retryable failures.
    ///
    /// Every attempt signs the same skeleton, so a retry broadcasts the
    /// transaction that may already have reached the node.
    async fn submit(&self, skeleton: &TransactionSkeleton) -> Result<B256, MintError> {
        let config = &self.context.config;
        let mut attempt = 0;
        loop {
            match self.try_submit(skeleton).await {
                Err(e) if e.is_retryable() && attempt < config.submit_retries => {
                    let delay = config
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt as u32));
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = config.submit_retries,
                        ?delay,
                        error = %e,
                        "submission failed, retrying"
                    );
                    sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn try_submit(&self, skeleton: &TransactionSkeleton) -> Result<B256, MintError> {
        let tx = self.assembler.sign(skeleton, &self.context.signer)?;
        let tx_hash = tx.hash();
        let accepted = self
            .context
            .client
            .send_transaction(&tx)
            .await
            .map_err(|e| SubmissionError::Client {
                tx_hash,
                source: Box::new(e),
            })?;
        if accepted != tx_hash {
            warn!(%tx_hash, %accepted, "node reported a different transaction hash");
        }
        Ok(tx_hash)
    }

    fn transition(&self, progress: &mut MintProgress, state: MintState) {
        if state != MintState::Idle {
            info!(%state, "mint state changed");
        }
        progress.state = state;
        self.state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::ConfirmationPolicy;
    use crate::error::FundingError;
    use crate::memory::MemoryLedger;
    use crate::provider::TxStatus;
    use spore_networks::testnet;
    use spore_primitives::{Capacity, Segment, SegmentError, reassemble};
    use spore_signer::Secp256k1Signer;
    use std::time::Duration;

    fn signer() -> Secp256k1Signer {
        Secp256k1Signer::from_bytes(&B256::repeat_byte(0x5a)).unwrap()
    }

    fn config() -> MintConfig {
        MintConfig {
            confirmation: ConfirmationPolicy {
                poll_interval: Duration::from_millis(100),
                max_poll_interval: Duration::from_secs(1),
                timeout: Duration::from_secs(30),
            },
            ..MintConfig::default()
        }
    }

    fn orchestrator<'a>(
        ledger: &'a MemoryLedger,
        signer: &'a Secp256k1Signer,
        config: MintConfig,
    ) -> MintOrchestrator<&'a MemoryLedger, &'a Secp256k1Signer> {
        MintOrchestrator::new(MintContext {
            client: ledger,
            signer,
            config,
        })
        .unwrap()
    }

    fn file(len: usize) -> Bytes {
        (0..len).map(|i| (i % 251) as u8).collect::<Vec<_>>().into()
    }

    /// Segment cells on the ledger bound to `type_hash`, by index.
    fn segments_on_ledger(ledger: &MemoryLedger, type_hash: B256) -> Vec<Segment> {
        let mut segments: Vec<Segment> = ledger
            .live()
            .into_iter()
            .filter(|live| {
                testnet::BINDING_LIFECYCLE.runs(live.cell.lock())
                    && live.cell.lock().args().as_ref() == type_hash.as_slice()
            })
            .map(|live| Segment::decode(live.cell.data().clone()).unwrap())
            .collect();
        segments.sort_by_key(Segment::index);
        segments
    }

    fn spores_on_ledger(ledger: &MemoryLedger) -> usize {
        ledger
            .live()
            .iter()
            .filter(|live| live.cell.type_().is_some_and(|t| testnet::SPORE.runs(t)))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mints_root_and_segments() {
        let signer = signer();
        let ledger = MemoryLedger::new().with_commit_after_polls(2);
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        let orchestrator = orchestrator(&ledger, &signer, config());
        let states = orchestrator.subscribe();

        let content = file(250);
        let report = orchestrator.mint(content.clone()).await.unwrap();

        let spore = report.spore.unwrap();
        assert_eq!(spore.type_hash, report.spore_type_hash);
        assert_eq!(report.segments.len(), 3);
        assert_eq!(
            report.segments.iter().map(|s| s.index).collect::<Vec<_>>(),
            [0, 1, 2]
        );
        assert_eq!(orchestrator.state(), MintState::Done);
        assert_eq!(*states.borrow(), MintState::Done);

        assert_eq!(ledger.attempts().len(), 4);
        assert_eq!(ledger.status(&spore.tx_hash), TxStatus::Committed);
        assert_eq!(spores_on_ledger(&ledger), 1);

        let segments = segments_on_ledger(&ledger, report.spore_type_hash);
        let lengths: Vec<usize> = segments.iter().map(Segment::encoded_len).collect();
        assert_eq!(lengths, [101, 101, 51]);
        assert_eq!(reassemble(&segments).unwrap(), content);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_root_builds_no_segments() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        ledger.reject_attempt(0, "out of capacity");
        let orchestrator = orchestrator(&ledger, &signer, config());

        let failure = orchestrator.mint(file(250)).await.unwrap_err();

        match &failure.error {
            MintError::Confirmation(ConfirmationError::Rejected { status, .. }) => {
                assert_eq!(status, &TxStatus::Rejected("out of capacity".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(failure.progress.next_segment, 0);
        assert_eq!(failure.progress.spore_type_hash, None);
        assert_eq!(failure.progress.resume_point(), None);
        assert_eq!(failure.progress.pending_root, None);
        assert!(matches!(failure.progress.state, MintState::RootSubmitted { .. }));
        assert_eq!(orchestrator.state(), MintState::Failed);
        assert_eq!(ledger.attempts().len(), 1);
        assert_eq!(orchestrator.assembler.reservations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_resubmits_same_transaction() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        // root, segment 0, then segment 1 fails twice
        ledger.fail_attempt(2);
        ledger.fail_attempt(3);
        let orchestrator = orchestrator(&ledger, &signer, config());

        let report = orchestrator.mint(file(250)).await.unwrap();

        let attempts = ledger.attempts();
        assert_eq!(attempts.len(), 6);
        assert_eq!(attempts[2], attempts[3]);
        assert_eq!(attempts[3], attempts[4]);
        assert_eq!(report.segments[1].tx_hash, attempts[4].hash());
        assert_eq!(ledger.accepted().len(), 4);
        assert_eq!(spores_on_ledger(&ledger), 1);
        assert_eq!(segments_on_ledger(&ledger, report.spore_type_hash).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_after_exhausted_retries() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        ledger.fail_attempt(2);
        let content = file(250);

        let config = MintConfig {
            submit_retries: 0,
            ..config()
        };
        let failure = orchestrator(&ledger, &signer, config)
            .mint(content.clone())
            .await
            .unwrap_err();

        assert!(matches!(failure.error, MintError::Submission(_)));
        assert_eq!(failure.progress.state, MintState::SegmentConfirmed { index: 0 });
        let point = failure.progress.resume_point().unwrap();
        assert_eq!(point.next_segment, 1);

        let report = orchestrator(&ledger, &signer, self::config())
            .resume(content.clone(), point)
            .await
            .unwrap();

        assert_eq!(report.spore, None);
        assert_eq!(report.spore_type_hash, point.spore_type_hash);
        assert_eq!(
            report.segments.iter().map(|s| s.index).collect::<Vec<_>>(),
            [1, 2]
        );
        assert_eq!(spores_on_ledger(&ledger), 1);
        let segments = segments_on_ledger(&ledger, point.spore_type_hash);
        assert_eq!(reassemble(&segments).unwrap(), content);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_out_of_range() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        let point = ResumePoint {
            spore_type_hash: B256::repeat_byte(1),
            next_segment: 4,
        };

        let failure = orchestrator(&ledger, &signer, config())
            .resume(file(250), point)
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MintError::Input(InputError::ResumeOutOfRange {
                next_segment: 4,
                segment_count: 3
            })
        ));
        assert!(ledger.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_too_many_segments_fails_before_building() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        let config = MintConfig {
            segment_size: 1,
            ..config()
        };
        let orchestrator = orchestrator(&ledger, &signer, config);

        let failure = orchestrator.mint(file(257)).await.unwrap_err();

        assert!(matches!(
            failure.error,
            MintError::Input(InputError::Segment(SegmentError::TooManySegments { count: 257, .. }))
        ));
        assert!(orchestrator.assembler.reservations().is_empty());
        assert!(ledger.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insufficient_funds() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(150).unwrap());

        let failure = orchestrator(&ledger, &signer, config())
            .mint(file(10))
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MintError::Funding(FundingError::InsufficientCapacity { .. })
        ));
        assert_eq!(failure.progress.state, MintState::Idle);
        assert!(ledger.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_file_mints_root_only() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(1_000).unwrap());

        let report = orchestrator(&ledger, &signer, config())
            .mint(Bytes::new())
            .await
            .unwrap();

        assert!(report.spore.is_some());
        assert!(report.segments.is_empty());
        assert_eq!(ledger.attempts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_timeout_keeps_progress() {
        let signer = signer();
        let ledger = MemoryLedger::new().with_commit_after_polls(usize::MAX);
        ledger.fund(&signer.lock_script(), Capacity::ckb(1_000).unwrap());

        let failure = orchestrator(&ledger, &signer, config())
            .mint(file(10))
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MintError::Confirmation(ConfirmationError::Timeout {
                last_status: Some(TxStatus::Pending),
                ..
            })
        ));
        assert!(!failure.error.is_retryable());
        assert!(failure.progress.pending_root.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_root_committing_after_timeout_is_resumed() {
        let signer = signer();
        let ledger = MemoryLedger::new().with_commit_after_polls(60);
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        let content = file(250);

        let failure = orchestrator(&ledger, &signer, config())
            .mint(content.clone())
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MintError::Confirmation(ConfirmationError::Timeout { .. })
        ));
        assert_eq!(failure.progress.resume_point(), None);
        let root = failure.progress.pending_root.unwrap();
        assert_eq!(
            failure.progress.state,
            MintState::RootSubmitted {
                tx_hash: root.tx_hash
            }
        );

        let patient = MintConfig {
            confirmation: ConfirmationPolicy {
                timeout: Duration::from_secs(120),
                ..config().confirmation
            },
            ..config()
        };
        wait_for_confirmation(&ledger, root.tx_hash, &patient.confirmation)
            .await
            .unwrap();
        assert_eq!(ledger.status(&root.tx_hash), TxStatus::Committed);

        let point = ResumePoint {
            spore_type_hash: root.type_hash,
            next_segment: 0,
        };
        let report = orchestrator(&ledger, &signer, patient)
            .resume(content.clone(), point)
            .await
            .unwrap();

        assert_eq!(report.segments.len(), 3);
        assert_eq!(spores_on_ledger(&ledger), 1);
        let segments = segments_on_ledger(&ledger, root.type_hash);
        assert_eq!(reassemble(&segments).unwrap(), content);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_segment_is_not_pending() {
        let signer = signer();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(2_000).unwrap());
        ledger.reject_attempt(1, "script error");

        let failure = orchestrator(&ledger, &signer, config())
            .mint(file(250))
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MintError::Confirmation(ConfirmationError::Rejected { .. })
        ));
        assert_eq!(failure.progress.pending_root, None);
        assert_eq!(failure.progress.pending_segment, None);
        assert!(matches!(
            failure.progress.state,
            MintState::SegmentSubmitted { index: 0, .. }
        ));
        assert_eq!(failure.progress.resume_point().unwrap().next_segment, 0);
    }
}
