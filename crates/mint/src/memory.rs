//! In-memory ledger.
//!
//! [`MemoryLedger`] plays both the indexer and the node: it hands out the
//! plain cells it was funded with, accepts transactions after checking
//! them the way a node would, and commits them after a configurable number
//! of status polls. Like a real indexer, cells spent by a pending
//! transaction keep being reported live until that transaction commits.
//!
//! Failures can be scripted per submission attempt, counted from zero
//! across the lifetime of the ledger.

use alloy_primitives::B256;
use parking_lot::Mutex;
use spore_primitives::{
    Capacity, CapacityError, Cell, CellOutput, LiveCell, OutPoint, Script, Transaction, ckb_hash,
};
use std::collections::{HashMap, HashSet};
use std::future::{Future, ready};
use thiserror::Error;

use crate::fee::{FeeRate, calculate_fee};
use crate::provider::{CellProvider, LedgerClient, TxStatus};

/// Errors returned by [`MemoryLedger`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryLedgerError {
    /// A scripted transient failure.
    #[error("ledger unavailable")]
    Unavailable,

    /// An input is not a live cell.
    #[error("unknown input {0}")]
    UnknownInput(OutPoint),

    /// An input is already spent by a pending transaction.
    #[error("input {0} is already spent")]
    DoubleSpend(OutPoint),

    /// An output holds less than it occupies.
    #[error("output {index} holds {capacity}, occupies {occupied}")]
    InsufficientCellCapacity {
        /// Output index.
        index: usize,
        /// Capacity held.
        capacity: Capacity,
        /// Capacity occupied.
        occupied: Capacity,
    },

    /// Outputs exceed inputs.
    #[error("outputs {outputs} exceed inputs {inputs}")]
    Unbalanced {
        /// Sum of inputs.
        inputs: Capacity,
        /// Sum of outputs.
        outputs: Capacity,
    },

    /// The fee is below the minimum for the transaction size.
    #[error("fee {fee} below minimum {required}")]
    FeeTooLow {
        /// Fee paid.
        fee: Capacity,
        /// Minimum fee.
        required: Capacity,
    },

    /// Fewer witnesses than inputs.
    #[error("{witnesses} witnesses for {inputs} inputs")]
    MissingWitness {
        /// Number of inputs.
        inputs: usize,
        /// Number of witnesses.
        witnesses: usize,
    },

    /// Capacity arithmetic failed.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

#[derive(Debug)]
struct Entry {
    tx: Option<Transaction>,
    status: TxStatus,
    polls: usize,
}

#[derive(Debug, Default)]
struct Inner {
    live: Vec<LiveCell>,
    spent: HashSet<OutPoint>,
    entries: HashMap<B256, Entry>,
    rejections: HashMap<usize, String>,
    transient_failures: HashSet<usize>,
    attempts: Vec<Transaction>,
    fundings: u64,
}

/// A ledger held in memory.
#[derive(Debug)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
    commit_after_polls: usize,
    fee_rate: FeeRate,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// An empty ledger that commits on the first status poll.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            commit_after_polls: 1,
            fee_rate: FeeRate::DEFAULT,
        }
    }

    /// Commits pending transactions on the `polls`-th status query.
    pub fn with_commit_after_polls(mut self, polls: usize) -> Self {
        self.commit_after_polls = polls.max(1);
        self
    }

    /// Minimum fee rate enforced on submission.
    pub const fn with_fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Creates a plain cell of `capacity` guarded by `lock`.
    pub fn fund(&self, lock: &Script, capacity: Capacity) -> OutPoint {
        let mut inner = self.inner.lock();
        inner.fundings += 1;
        let tx_hash = ckb_hash(&inner.fundings.to_le_bytes());
        let out_point = OutPoint::new(tx_hash, 0);
        let cell = Cell::new(CellOutput::new(capacity, lock.clone(), None), Vec::new());
        inner.live.push(LiveCell::new(out_point, cell));
        out_point
    }

    /// Registers a pending transaction known only by hash.
    pub fn insert_pending(&self, tx_hash: B256) -> B256 {
        self.inner.lock().entries.insert(
            tx_hash,
            Entry {
                tx: None,
                status: TxStatus::Pending,
                polls: 0,
            },
        );
        tx_hash
    }

    /// Rejects a known transaction, releasing its inputs.
    pub fn reject(&self, tx_hash: B256, reason: impl Into<String>) {
        let mut inner = self.inner.lock();
        let Some(entry) = inner.entries.get_mut(&tx_hash) else {
            return;
        };
        entry.status = TxStatus::Rejected(reason.into());
        let released: Vec<OutPoint> = entry
            .tx
            .iter()
            .flat_map(|tx| tx.raw().inputs.iter().map(|input| input.previous_output))
            .collect();
        for out_point in released {
            inner.spent.remove(&out_point);
        }
    }

    /// Accepts submission `attempt` and later reports it rejected.
    pub fn reject_attempt(&self, attempt: usize, reason: impl Into<String>) {
        self.inner.lock().rejections.insert(attempt, reason.into());
    }

    /// Fails submission `attempt` with [`MemoryLedgerError::Unavailable`].
    pub fn fail_attempt(&self, attempt: usize) {
        self.inner.lock().transient_failures.insert(attempt);
    }

    /// Every transaction passed to `send_transaction`, in order.
    pub fn attempts(&self) -> Vec<Transaction> {
        self.inner.lock().attempts.clone()
    }

    /// Transactions accepted into the ledger, committed or not.
    pub fn accepted(&self) -> Vec<Transaction> {
        let inner = self.inner.lock();
        let mut seen = HashSet::new();
        inner
            .attempts
            .iter()
            .filter(|tx| {
                let hash = tx.hash();
                inner.entries.contains_key(&hash) && seen.insert(hash)
            })
            .cloned()
            .collect()
    }

    /// Status of a transaction without counting a poll.
    pub fn status(&self, tx_hash: &B256) -> TxStatus {
        self.inner
            .lock()
            .entries
            .get(tx_hash)
            .map_or(TxStatus::Unknown, |entry| entry.status.clone())
    }

    /// Number of status queries made for a transaction.
    pub fn status_polls(&self, tx_hash: &B256) -> usize {
        self.inner
            .lock()
            .entries
            .get(tx_hash)
            .map_or(0, |entry| entry.polls)
    }

    /// All live cells, including those spent by pending transactions.
    pub fn live(&self) -> Vec<LiveCell> {
        self.inner.lock().live.clone()
    }

    fn submit(&self, tx: &Transaction) -> Result<B256, MemoryLedgerError> {
        let mut inner = self.inner.lock();
        let attempt = inner.attempts.len();
        inner.attempts.push(tx.clone());

        if inner.transient_failures.contains(&attempt) {
            return Err(MemoryLedgerError::Unavailable);
        }

        let tx_hash = tx.hash();
        if inner.entries.contains_key(&tx_hash) {
            return Ok(tx_hash);
        }

        let raw = tx.raw();
        let mut inputs = Capacity::ZERO;
        for input in &raw.inputs {
            let out_point = input.previous_output;
            let cell = inner
                .live
                .iter()
                .find(|live| live.out_point == out_point)
                .ok_or(MemoryLedgerError::UnknownInput(out_point))?;
            if inner.spent.contains(&out_point) {
                return Err(MemoryLedgerError::DoubleSpend(out_point));
            }
            inputs = inputs.safe_add(cell.cell.capacity())?;
        }

        if tx.witnesses().len() < raw.inputs.len() {
            return Err(MemoryLedgerError::MissingWitness {
                inputs: raw.inputs.len(),
                witnesses: tx.witnesses().len(),
            });
        }

        for (index, (output, data)) in raw.outputs.iter().zip(&raw.outputs_data).enumerate() {
            let cell = Cell::new(output.clone(), data.clone());
            let occupied = cell.occupied_capacity()?;
            if cell.capacity() < occupied {
                return Err(MemoryLedgerError::InsufficientCellCapacity {
                    index,
                    capacity: cell.capacity(),
                    occupied,
                });
            }
        }

        let outputs = raw.outputs_capacity()?;
        if inputs < outputs {
            return Err(MemoryLedgerError::Unbalanced { inputs, outputs });
        }
        let fee = inputs.safe_sub(outputs)?;
        let required = calculate_fee(tx.serialized_size_in_block(), self.fee_rate)?;
        if fee < required {
            return Err(MemoryLedgerError::FeeTooLow { fee, required });
        }

        let rejection = inner.rejections.get(&attempt).cloned();
        let status = match rejection {
            Some(reason) => TxStatus::Rejected(reason),
            None => {
                inner
                    .spent
                    .extend(raw.inputs.iter().map(|input| input.previous_output));
                TxStatus::Pending
            }
        };
        inner.entries.insert(
            tx_hash,
            Entry {
                tx: Some(tx.clone()),
                status,
                polls: 0,
            },
        );
        Ok(tx_hash)
    }

    fn poll(&self, tx_hash: &B256) -> TxStatus {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let Some(entry) = inner.entries.get_mut(tx_hash) else {
            return TxStatus::Unknown;
        };

        entry.polls += 1;
        if entry.status == TxStatus::Pending && entry.polls >= self.commit_after_polls {
            entry.status = TxStatus::Committed;
            if let Some(tx) = &entry.tx {
                let consumed: HashSet<OutPoint> = tx
                    .raw()
                    .inputs
                    .iter()
                    .map(|input| input.previous_output)
                    .collect();
                inner.live.retain(|live| !consumed.contains(&live.out_point));
                inner.spent.retain(|out_point| !consumed.contains(out_point));

                let raw = tx.raw();
                for (index, (output, data)) in raw.outputs.iter().zip(&raw.outputs_data).enumerate()
                {
                    inner.live.push(LiveCell::new(
                        OutPoint::new(*tx_hash, index as u32),
                        Cell::new(output.clone(), data.clone()),
                    ));
                }
            }
        }
        entry.status.clone()
    }
}

impl CellProvider for MemoryLedger {
    type Error = MemoryLedgerError;

    fn live_cells(
        &self,
        lock: &Script,
    ) -> impl Future<Output = Result<Vec<LiveCell>, Self::Error>> + Send {
        let cells = self
            .inner
            .lock()
            .live
            .iter()
            .filter(|live| live.cell.lock() == lock && live.cell.is_plain())
            .cloned()
            .collect();
        ready(Ok(cells))
    }
}

impl LedgerClient for MemoryLedger {
    type Error = MemoryLedgerError;

    fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> impl Future<Output = Result<B256, Self::Error>> + Send {
        ready(self.submit(tx))
    }

    fn transaction_status(
        &self,
        tx_hash: &B256,
    ) -> impl Future<Output = Result<TxStatus, Self::Error>> + Send {
        ready(Ok(self.poll(tx_hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Assembler;
    use spore_networks::testnet;
    use spore_primitives::Segment;
    use spore_signer::Secp256k1Signer;

    async fn signed_segment(
        ledger: &MemoryLedger,
        signer: &Secp256k1Signer,
        payload: u8,
    ) -> Transaction {
        let assembler = Assembler::new(testnet::DEPLOYMENTS, FeeRate::DEFAULT);
        let skeleton = assembler
            .assemble_segment(
                ledger,
                &signer.lock_script(),
                B256::repeat_byte(1),
                &Segment::new(0, vec![payload; 100]),
            )
            .await
            .unwrap();
        assembler.sign(&skeleton, signer).unwrap()
    }

    #[tokio::test]
    async fn test_commit_moves_cells() {
        let signer = Secp256k1Signer::from_bytes(&B256::repeat_byte(0x42)).unwrap();
        let owner = signer.lock_script();
        let ledger = MemoryLedger::new().with_commit_after_polls(2);
        let funding = ledger.fund(&owner, Capacity::ckb(1_000).unwrap());

        let tx = signed_segment(&ledger, &signer, 1).await;
        let hash = ledger.send_transaction(&tx).await.unwrap();
        assert_eq!(hash, tx.hash());

        // Still reported live until committed
        assert_eq!(ledger.live_cells(&owner).await.unwrap().len(), 1);
        assert_eq!(ledger.transaction_status(&hash).await.unwrap(), TxStatus::Pending);
        assert_eq!(ledger.transaction_status(&hash).await.unwrap(), TxStatus::Committed);

        let live = ledger.live();
        assert!(live.iter().all(|cell| cell.out_point != funding));
        assert_eq!(live.len(), 2);
        let change = ledger.live_cells(&owner).await.unwrap();
        assert_eq!(change.len(), 1);
        assert_eq!(change[0].out_point, OutPoint::new(hash, 1));
    }

    #[tokio::test]
    async fn test_rejects_double_spend_and_replays_idempotently() {
        let signer = Secp256k1Signer::from_bytes(&B256::repeat_byte(0x42)).unwrap();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(1_000).unwrap());

        let tx = signed_segment(&ledger, &signer, 1).await;
        let hash = ledger.send_transaction(&tx).await.unwrap();
        assert_eq!(ledger.send_transaction(&tx).await.unwrap(), hash);

        // A fresh assembler does not know the first reservation
        let conflicting = signed_segment(&ledger, &signer, 2).await;
        assert_ne!(conflicting.hash(), hash);
        assert!(matches!(
            ledger.send_transaction(&conflicting).await,
            Err(MemoryLedgerError::DoubleSpend(_))
        ));
        assert_eq!(ledger.attempts().len(), 3);
        assert_eq!(ledger.accepted(), [tx]);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let signer = Secp256k1Signer::from_bytes(&B256::repeat_byte(0x42)).unwrap();
        let ledger = MemoryLedger::new();
        ledger.fund(&signer.lock_script(), Capacity::ckb(1_000).unwrap());
        ledger.fail_attempt(0);
        ledger.reject_attempt(1, "out of capacity");

        let tx = signed_segment(&ledger, &signer, 1).await;
        assert_eq!(
            ledger.send_transaction(&tx).await,
            Err(MemoryLedgerError::Unavailable)
        );
        let hash = ledger.send_transaction(&tx).await.unwrap();
        assert_eq!(
            ledger.transaction_status(&hash).await.unwrap(),
            TxStatus::Rejected("out of capacity".into())
        );
    }

    #[tokio::test]
    async fn test_rejects_unknown_input() {
        let signer = Secp256k1Signer::from_bytes(&B256::repeat_byte(0x42)).unwrap();
        let funded = MemoryLedger::new();
        funded.fund(&signer.lock_script(), Capacity::ckb(1_000).unwrap());
        let tx = signed_segment(&funded, &signer, 1).await;

        let empty = MemoryLedger::new();
        assert!(matches!(
            empty.send_transaction(&tx).await,
            Err(MemoryLedgerError::UnknownInput(_))
        ));
    }
}
