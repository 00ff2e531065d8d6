//! Cell builders.
//!
//! Every builder starts from zero capacity and then writes the cell's exact
//! occupied capacity, so no built cell ever holds less than it occupies.

use alloy_primitives::B256;
use spore_networks::ScriptDeployment;
use spore_primitives::spore::SPORE_ID_SIZE;
use spore_primitives::{Capacity, CapacityError, Cell, CellOutput, Script, Segment, SporeData};

/// The root spore cell.
///
/// The type args are zeroed; the real spore id depends on the transaction's
/// first input and is sealed once inputs are chosen.
pub fn spore_cell(
    owner_lock: &Script,
    spore: &ScriptDeployment,
    data: &SporeData,
) -> Result<Cell, CapacityError> {
    let type_script = spore.script(vec![0u8; SPORE_ID_SIZE]);
    Cell::new(
        CellOutput::new(Capacity::ZERO, owner_lock.clone(), Some(type_script)),
        data.encode(),
    )
    .with_occupied_capacity()
}

/// A segment cell bound to its spore.
///
/// Locked by the binding lifecycle script with the spore's type hash as
/// args. The cell carries no type script.
pub fn segment_cell(
    binding_lifecycle: &ScriptDeployment,
    spore_type_hash: B256,
    segment: &Segment,
) -> Result<Cell, CapacityError> {
    let lock = binding_lifecycle.script(spore_type_hash.to_vec());
    Cell::new(CellOutput::new(Capacity::ZERO, lock, None), segment.encode())
        .with_occupied_capacity()
}

/// A plain change cell for the owner.
pub fn change_cell(owner_lock: &Script) -> Result<Cell, CapacityError> {
    Cell::new(CellOutput::new(Capacity::ZERO, owner_lock.clone(), None), Vec::new())
        .with_occupied_capacity()
}
