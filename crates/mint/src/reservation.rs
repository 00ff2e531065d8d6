//! Input reservations.
//!
//! An indexer keeps reporting a cell as live until the transaction spending
//! it is committed. Each input chosen during a run is reserved so a later
//! transaction in the same run never selects it again.

use parking_lot::Mutex;
use spore_primitives::OutPoint;
use std::collections::HashSet;

/// Out points already committed to a transaction in this run.
#[derive(Debug, Default)]
pub struct InputReservations {
    reserved: Mutex<HashSet<OutPoint>>,
}

impl InputReservations {
    /// An empty reservation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves out points.
    pub fn reserve<I: IntoIterator<Item = OutPoint>>(&self, out_points: I) {
        self.reserved.lock().extend(out_points);
    }

    /// Whether an out point is reserved.
    pub fn is_reserved(&self, out_point: &OutPoint) -> bool {
        self.reserved.lock().contains(out_point)
    }

    /// Number of reserved out points.
    pub fn len(&self) -> usize {
        self.reserved.lock().len()
    }

    /// Whether nothing is reserved.
    pub fn is_empty(&self) -> bool {
        self.reserved.lock().is_empty()
    }
}
