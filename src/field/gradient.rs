//! Per-faction scalar guidance field
//!
//! Lower values mean "closer to this faction's cursor". Cells no wave has
//! reached yet hold [`UNREACHED`]. The field is never reset during a match;
//! only the cursor cell is rewritten each tick, and propagation lowers
//! values from neighbor to neighbor.

use crate::core::types::CellCoord;
use crate::map::obstacle_map::ObstacleMap;

/// Sentinel for cells no wave has reached; greater than any real distance
pub const UNREACHED: u32 = u32::MAX;

/// Dense per-cell values for one faction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientField {
    width: usize,
    values: Vec<u32>,
}

impl GradientField {
    /// Field covering `map` with every cell unreached
    pub fn new(map: &ObstacleMap) -> Self {
        Self {
            width: map.width(),
            values: vec![UNREACHED; map.len()],
        }
    }

    #[inline]
    pub fn value(&self, index: usize) -> u32 {
        self.values[index]
    }

    /// Value at a coordinate, `None` when off the field
    pub fn value_at(&self, cell: CellCoord) -> Option<u32> {
        if cell.x < 0 || cell.y < 0 || cell.x as usize >= self.width {
            return None;
        }
        self.values
            .get(cell.y as usize * self.width + cell.x as usize)
            .copied()
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: u32) {
        self.values[index] = value;
    }

    /// Raw values for debugging and visualization
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [u32] {
        &mut self.values
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells some wave has reached
    pub fn reached_cells(&self) -> usize {
        self.values.iter().filter(|v| **v != UNREACHED).count()
    }
}
