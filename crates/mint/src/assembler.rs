//! Transaction assembly.
//!
//! The [`Assembler`] turns one output (a spore cell or a segment cell) into
//! a funded, validated skeleton ready for signing:
//!
//! 1. push the output
//! 2. push cell dependencies, script first and lock second
//! 3. select plain owner cells until outputs, fee and change are covered
//! 4. seal the type id, for spores
//! 5. validate every invariant a node would check
//!
//! Funding never partially succeeds: either the skeleton is fully funded or
//! assembly fails with [`FundingError::InsufficientCapacity`].

use alloy_primitives::B256;
use spore_networks::Deployments;
use spore_primitives::{Capacity, LiveCell, Script, Segment, SporeData, Transaction, type_id_args};
use tracing::debug;

use crate::builder;
use crate::error::{BuildError, FundingError, MintError, SubmissionError};
use crate::fee::{FeeRate, calculate_fee, estimate_fee};
use crate::provider::{CellProvider, Signer};
use crate::reservation::InputReservations;
use crate::skeleton::TransactionSkeleton;

/// A funded root spore transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSpore {
    /// The funded skeleton.
    pub skeleton: TransactionSkeleton,
    /// Index of the spore output.
    pub output_index: usize,
    /// Spore id, the sealed type args.
    pub spore_id: B256,
    /// Hash of the spore type script.
    pub type_hash: B256,
}

/// Builds and funds mint transactions.
#[derive(Debug)]
pub struct Assembler {
    deployments: Deployments,
    fee_rate: FeeRate,
    reservations: InputReservations,
}

impl Assembler {
    /// Creates an assembler with an empty reservation set.
    pub fn new(deployments: Deployments, fee_rate: FeeRate) -> Self {
        Self {
            deployments,
            fee_rate,
            reservations: InputReservations::new(),
        }
    }

    /// Script deployments in use.
    #[inline]
    pub const fn deployments(&self) -> &Deployments {
        &self.deployments
    }

    /// Fee rate in use.
    #[inline]
    pub const fn fee_rate(&self) -> FeeRate {
        self.fee_rate
    }

    /// Inputs reserved by transactions assembled so far.
    #[inline]
    pub const fn reservations(&self) -> &InputReservations {
        &self.reservations
    }

    /// Assembles the root spore transaction.
    pub async fn assemble_spore<P>(
        &self,
        provider: &P,
        owner_lock: &Script,
        data: &SporeData,
    ) -> Result<AssembledSpore, MintError>
    where
        P: CellProvider + Sync,
    {
        let cell = builder::spore_cell(owner_lock, &self.deployments.spore, data)
            .map_err(BuildError::from)?;

        let mut skeleton = TransactionSkeleton::new();
        let output_index = skeleton.push_output(cell);
        skeleton
            .push_cell_dep(self.deployments.spore.cell_dep)
            .push_cell_dep(self.deployments.secp256k1_blake160.cell_dep);

        self.inject_capacity(provider, owner_lock, &mut skeleton)
            .await?;

        let first_input = skeleton
            .inputs()
            .first()
            .map(LiveCell::as_input)
            .ok_or(BuildError::NoInputs)?;
        let spore_id = type_id_args(&first_input, output_index as u64);
        skeleton.seal_type_id(output_index, spore_id)?;

        let type_hash = skeleton.outputs()[output_index]
            .type_()
            .map(Script::hash)
            .ok_or(BuildError::TypeIdSlot {
                index: output_index,
                expected: spore_id.len(),
            })?;

        self.validate(&skeleton)?;
        debug!(%spore_id, %type_hash, "assembled spore transaction");

        Ok(AssembledSpore {
            skeleton,
            output_index,
            spore_id,
            type_hash,
        })
    }

    /// Assembles the transaction creating one segment cell.
    pub async fn assemble_segment<P>(
        &self,
        provider: &P,
        owner_lock: &Script,
        spore_type_hash: B256,
        segment: &Segment,
    ) -> Result<TransactionSkeleton, MintError>
    where
        P: CellProvider + Sync,
    {
        let cell =
            builder::segment_cell(&self.deployments.binding_lifecycle, spore_type_hash, segment)
                .map_err(BuildError::from)?;

        let mut skeleton = TransactionSkeleton::new();
        skeleton.push_output(cell);
        skeleton
            .push_cell_dep(self.deployments.binding_lifecycle.cell_dep)
            .push_cell_dep(self.deployments.secp256k1_blake160.cell_dep);

        self.inject_capacity(provider, owner_lock, &mut skeleton)
            .await?;
        self.validate(&skeleton)?;
        debug!(index = segment.index(), "assembled segment transaction");

        Ok(skeleton)
    }

    /// Funds the skeleton from the owner's live cells.
    pub async fn inject_capacity<P>(
        &self,
        provider: &P,
        owner_lock: &Script,
        skeleton: &mut TransactionSkeleton,
    ) -> Result<(), MintError>
    where
        P: CellProvider + Sync,
    {
        let candidates = provider
            .live_cells(owner_lock)
            .await
            .map_err(|e| FundingError::Provider(Box::new(e)))?;
        self.fund(skeleton, owner_lock, candidates)?;
        Ok(())
    }

    /// Selects inputs from `candidates` and appends change.
    ///
    /// Only plain cells of the owner lock that are not reserved are used, in
    /// the order given. Selection stops as soon as the inputs cover outputs
    /// plus fee exactly, or cover them with room for a change cell. The fee
    /// is estimated with the change cell present, which is never smaller
    /// than the final transaction.
    pub fn fund(
        &self,
        skeleton: &mut TransactionSkeleton,
        owner_lock: &Script,
        candidates: Vec<LiveCell>,
    ) -> Result<(), FundingError> {
        let outputs = skeleton.outputs_capacity()?;
        let change = builder::change_cell(owner_lock)?;
        let needed = |skeleton: &TransactionSkeleton| -> Result<Capacity, FundingError> {
            let mut probe = skeleton.clone();
            probe.push_output(change.clone());
            Ok(outputs.safe_add(estimate_fee(&probe, self.fee_rate)?)?)
        };

        let mut available = skeleton.inputs_capacity()?;
        let usable: Vec<LiveCell> = candidates.into_iter().filter(|candidate| {
            candidate.cell.is_plain()
                && candidate.cell.lock() == owner_lock
                && !self.reservations.is_reserved(&candidate.out_point)
                && !skeleton
                    .inputs()
                    .iter()
                    .any(|input| input.out_point == candidate.out_point)
        })
        .collect();

        for candidate in usable {
            available = available.safe_add(candidate.cell.capacity())?;
            skeleton.push_input(candidate);

            let required = needed(skeleton)?;
            let change_capacity = if available == required {
                None
            } else if available >= required.safe_add(change.capacity())? {
                Some(available.safe_sub(required)?)
            } else {
                continue;
            };

            if let Some(capacity) = change_capacity {
                let mut change = change.clone();
                change.output_mut().set_capacity(capacity);
                skeleton.push_output(change);
            }

            self.reservations
                .reserve(skeleton.inputs().iter().map(|input| input.out_point));
            let fee = skeleton.fee()?;
            debug!(
                inputs = skeleton.inputs().len(),
                %available,
                %fee,
                "funded transaction"
            );
            return Ok(());
        }

        Err(FundingError::InsufficientCapacity {
            required: needed(skeleton)?,
            available,
        })
    }

    /// Checks every invariant of a funded skeleton.
    pub fn validate(&self, skeleton: &TransactionSkeleton) -> Result<(), BuildError> {
        for (index, output) in skeleton.outputs().iter().enumerate() {
            let occupied = output.occupied_capacity()?;
            if output.capacity() < occupied {
                return Err(BuildError::InsufficientCellCapacity {
                    index,
                    capacity: output.capacity(),
                    occupied,
                });
            }
        }

        let raw = skeleton.to_raw();
        if raw.outputs.len() != raw.outputs_data.len() {
            return Err(BuildError::OutputsDataMismatch {
                outputs: raw.outputs.len(),
                outputs_data: raw.outputs_data.len(),
            });
        }

        self.validate_cell_deps(skeleton)?;

        let inputs = skeleton.inputs_capacity()?;
        let outputs = skeleton.outputs_capacity()?;
        if inputs < outputs {
            return Err(BuildError::Unbalanced { inputs, outputs });
        }
        let fee = inputs.safe_sub(outputs)?;
        let required = calculate_fee(skeleton.estimated_size(), self.fee_rate)?;
        if fee < required {
            return Err(BuildError::FeeTooLow { fee, required });
        }

        Ok(())
    }

    /// Script dependencies must be present and precede the lock dependency.
    fn validate_cell_deps(&self, skeleton: &TransactionSkeleton) -> Result<(), BuildError> {
        let deps = skeleton.cell_deps();
        let position = |dep| deps.iter().position(|d| *d == dep);

        let lock = self.deployments.secp256k1_blake160;
        let lock_position = position(lock.cell_dep);
        let needs_lock = skeleton
            .inputs()
            .iter()
            .any(|input| lock.runs(input.cell.lock()));
        if needs_lock && lock_position.is_none() {
            return Err(BuildError::MissingCellDep(lock.cell_dep.out_point));
        }

        let spore = self.deployments.spore;
        let binding = self.deployments.binding_lifecycle;
        let uses_spore = skeleton
            .outputs()
            .iter()
            .any(|output| output.type_().is_some_and(|script| spore.runs(script)));
        let uses_binding = skeleton
            .outputs()
            .iter()
            .any(|output| binding.runs(output.lock()));

        for (deployment, used) in [(spore, uses_spore), (binding, uses_binding)] {
            if !used {
                continue;
            }
            let script_position =
                position(deployment.cell_dep).ok_or(BuildError::MissingCellDep(deployment.cell_dep.out_point))?;
            if let Some(lock_position) = lock_position {
                if lock_position < script_position {
                    return Err(BuildError::CellDepOrder {
                        script: deployment.cell_dep.out_point,
                        lock: lock.cell_dep.out_point,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validates and signs a skeleton, leaving the skeleton untouched.
    ///
    /// Signatures are deterministic, so signing the same skeleton again
    /// produces the same transaction.
    pub fn sign<S: Signer>(
        &self,
        skeleton: &TransactionSkeleton,
        signer: &S,
    ) -> Result<Transaction, MintError> {
        self.validate(skeleton)?;

        let mut skeleton = skeleton.clone();
        let owner = signer.lock_script();
        let entries = skeleton.prepare_signing_entries().to_vec();

        let mut signatures = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.lock != owner {
                return Err(BuildError::ForeignLock {
                    index: entry.input_indices[0],
                }
                .into());
            }
            let signature = signer
                .sign_message(&entry.message)
                .map_err(|e| SubmissionError::Signing(Box::new(e)))?;
            signatures.push(signature);
        }

        Ok(skeleton.into_transaction(&signatures)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedger;
    use spore_networks::testnet;
    use spore_primitives::{CellDep, DepType, OutPoint, ckb_hash};
    use spore_signer::Secp256k1Signer;

    fn signer() -> Secp256k1Signer {
        Secp256k1Signer::from_bytes(&B256::repeat_byte(0x11)).unwrap()
    }

    fn assembler() -> Assembler {
        Assembler::new(testnet::DEPLOYMENTS, FeeRate::DEFAULT)
    }

    fn spore_data() -> SporeData {
        SporeData::from_content_hash("video/mp4+spore", ckb_hash(b"content")).unwrap()
    }

    #[tokio::test]
    async fn test_segment_transaction_layout() {
        let owner = signer().lock_script();
        let ledger = MemoryLedger::new();
        ledger.fund(&owner, Capacity::ckb(1_000).unwrap());

        let assembler = assembler();
        let segment = Segment::new(0, vec![5u8; 100]);
        let skeleton = assembler
            .assemble_segment(&ledger, &owner, B256::repeat_byte(3), &segment)
            .await
            .unwrap();

        assert_eq!(
            skeleton.cell_deps(),
            [testnet::BINDING_LIFECYCLE.cell_dep, testnet::SECP256K1_BLAKE160.cell_dep]
        );
        assert_eq!(skeleton.outputs().len(), 2);
        assert_eq!(skeleton.outputs()[0].capacity(), Capacity::ckb(174).unwrap());
        assert_eq!(skeleton.outputs()[1].lock(), &owner);
        let required = calculate_fee(skeleton.estimated_size(), FeeRate::DEFAULT).unwrap();
        assert!(skeleton.fee().unwrap() >= required);
        assert_eq!(assembler.reservations().len(), 1);
    }

    #[tokio::test]
    async fn test_spore_type_id_is_sealed() {
        let owner = signer().lock_script();
        let ledger = MemoryLedger::new();
        ledger.fund(&owner, Capacity::ckb(1_000).unwrap());

        let assembled = assembler()
            .assemble_spore(&ledger, &owner, &spore_data())
            .await
            .unwrap();

        let skeleton = &assembled.skeleton;
        let first = skeleton.inputs()[0].as_input();
        assert_eq!(assembled.spore_id, type_id_args(&first, 0));

        let type_script = skeleton.outputs()[0].type_().unwrap();
        assert_eq!(type_script.args().as_ref(), assembled.spore_id.as_slice());
        assert_eq!(type_script.hash(), assembled.type_hash);
        assert_eq!(skeleton.cell_deps()[0], testnet::SPORE.cell_dep);
    }

    #[tokio::test]
    async fn test_insufficient_capacity() {
        let owner = signer().lock_script();
        let ledger = MemoryLedger::new();
        ledger.fund(&owner, Capacity::ckb(100).unwrap());

        let err = assembler()
            .assemble_segment(&ledger, &owner, B256::ZERO, &Segment::new(0, vec![0u8; 100]))
            .await
            .unwrap_err();

        match err {
            MintError::Funding(FundingError::InsufficientCapacity { required, available }) => {
                assert_eq!(available, Capacity::ckb(100).unwrap());
                assert!(required > Capacity::ckb(174).unwrap());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exact_funding_needs_no_change() {
        let owner = signer().lock_script();
        let assembler = assembler();
        let segment = Segment::new(0, vec![1u8; 10]);

        let mut skeleton = TransactionSkeleton::new();
        skeleton.push_output(
            builder::segment_cell(&testnet::BINDING_LIFECYCLE, B256::ZERO, &segment).unwrap(),
        );
        skeleton
            .push_cell_dep(testnet::BINDING_LIFECYCLE.cell_dep)
            .push_cell_dep(testnet::SECP256K1_BLAKE160.cell_dep);

        // Work out what the exact amount must be
        let mut probe = skeleton.clone();
        let placeholder = LiveCell::new(
            OutPoint::new(B256::repeat_byte(1), 0),
            builder::change_cell(&owner).unwrap(),
        );
        probe.push_input(placeholder.clone());
        probe.push_output(builder::change_cell(&owner).unwrap());
        let exact = skeleton
            .outputs_capacity()
            .unwrap()
            .safe_add(estimate_fee(&probe, FeeRate::DEFAULT).unwrap())
            .unwrap();

        let mut input = placeholder;
        input.cell.output_mut().set_capacity(exact);
        assembler.fund(&mut skeleton, &owner, vec![input]).unwrap();

        assert_eq!(skeleton.outputs().len(), 1);
        assembler.validate(&skeleton).unwrap();
    }

    #[test]
    fn test_skips_reserved_and_non_plain_cells() {
        let owner = signer().lock_script();
        let assembler = assembler();
        let plain = |tx: u8| {
            let mut cell = builder::change_cell(&owner).unwrap();
            cell.output_mut().set_capacity(Capacity::ckb(500).unwrap());
            LiveCell::new(OutPoint::new(B256::repeat_byte(tx), 0), cell)
        };

        let reserved = plain(1);
        assembler.reservations().reserve([reserved.out_point]);
        let template = plain(2);
        let with_data = LiveCell::new(
            template.out_point,
            spore_primitives::Cell::new(template.cell.output().clone(), vec![1u8]),
        );
        let usable = plain(3);

        let mut skeleton = TransactionSkeleton::new();
        skeleton.push_output(builder::change_cell(&owner).unwrap());
        skeleton.push_cell_dep(testnet::SECP256K1_BLAKE160.cell_dep);
        assembler
            .fund(&mut skeleton, &owner, vec![reserved, with_data, usable.clone()])
            .unwrap();

        assert_eq!(skeleton.inputs(), [usable]);
    }

    #[tokio::test]
    async fn test_validate_rejects_under_capacity_output() {
        let owner = signer().lock_script();
        let ledger = MemoryLedger::new();
        ledger.fund(&owner, Capacity::ckb(1_000).unwrap());
        let assembler = assembler();

        let mut skeleton = assembler
            .assemble_segment(&ledger, &owner, B256::ZERO, &Segment::new(0, vec![0u8; 10]))
            .await
            .unwrap();
        let mut short = builder::change_cell(&owner).unwrap();
        short.output_mut().set_capacity(Capacity::ckb(60).unwrap());
        let index = skeleton.push_output(short);

        assert!(matches!(
            assembler.validate(&skeleton),
            Err(BuildError::InsufficientCellCapacity { index: i, .. }) if i == index
        ));
        assert!(assembler.sign(&skeleton, &signer()).is_err());
    }

    #[test]
    fn test_validate_rejects_misordered_deps() {
        let owner = signer().lock_script();
        let assembler = assembler();
        let segment = Segment::new(0, vec![1u8; 10]);

        let mut skeleton = TransactionSkeleton::new();
        skeleton.push_output(
            builder::segment_cell(&testnet::BINDING_LIFECYCLE, B256::ZERO, &segment).unwrap(),
        );
        skeleton
            .push_cell_dep(testnet::SECP256K1_BLAKE160.cell_dep)
            .push_cell_dep(testnet::BINDING_LIFECYCLE.cell_dep);
        let mut funding = builder::change_cell(&owner).unwrap();
        funding.output_mut().set_capacity(Capacity::ckb(1_000).unwrap());
        skeleton.push_input(LiveCell::new(OutPoint::new(B256::ZERO, 0), funding));

        assert_eq!(
            assembler.validate(&skeleton),
            Err(BuildError::CellDepOrder {
                script: testnet::BINDING_LIFECYCLE.cell_dep.out_point,
                lock: testnet::SECP256K1_BLAKE160.cell_dep.out_point,
            })
        );

        let mut missing = TransactionSkeleton::new();
        missing.push_output(
            builder::segment_cell(&testnet::BINDING_LIFECYCLE, B256::ZERO, &segment).unwrap(),
        );
        missing.push_cell_dep(CellDep::new(OutPoint::new(B256::ZERO, 9), DepType::Code));
        assert_eq!(
            assembler.validate(&missing),
            Err(BuildError::MissingCellDep(testnet::BINDING_LIFECYCLE.cell_dep.out_point))
        );
    }

    #[tokio::test]
    async fn test_sign_is_deterministic() {
        let signer = signer();
        let owner = signer.lock_script();
        let ledger = MemoryLedger::new();
        ledger.fund(&owner, Capacity::ckb(1_000).unwrap());
        let assembler = assembler();

        let skeleton = assembler
            .assemble_segment(&ledger, &owner, B256::ZERO, &Segment::new(0, vec![0u8; 50]))
            .await
            .unwrap();
        let first = assembler.sign(&skeleton, &signer).unwrap();
        let second = assembler.sign(&skeleton, &signer).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.serialized_size_in_block(), skeleton.estimated_size());

        let other = Secp256k1Signer::from_bytes(&B256::repeat_byte(0x22)).unwrap();
        assert!(matches!(
            assembler.sign(&skeleton, &other),
            Err(MintError::Build(BuildError::ForeignLock { index: 0 }))
        ));
    }
}
