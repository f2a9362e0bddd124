//! Faction cursors and the gradient source they inject
//!
//! A cursor carries a "freshness" value that is written into its faction's
//! field every tick. Freshness drops by one per tick while the cursor stays
//! put and jumps back to the configured maximum whenever it moves.
//!
//! The write is an overwrite, not a minimum: it can raise the cursor cell
//! above what propagation had already computed there. That behavior is
//! kept on purpose and can show up as brief ripples around a cursor.

use serde::{Deserialize, Serialize};

use crate::core::types::CellCoord;
use crate::field::gradient::GradientField;
use crate::map::obstacle_map::ObstacleMap;

/// Target point for one faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub position: CellCoord,
    pub active: bool,
    pub freshness: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: CellCoord::default(),
            active: false,
            freshness: 0,
        }
    }
}

/// What changed when a cursor was updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorUpdate {
    pub moved: bool,
    pub activated: bool,
    pub deactivated: bool,
}

impl Cursor {
    /// Apply an external position/active update
    ///
    /// Freshness resets to `max_freshness` on any move and on activation.
    pub fn update(&mut self, position: CellCoord, active: bool, max_freshness: u32) -> CursorUpdate {
        let update = CursorUpdate {
            moved: position != self.position,
            activated: active && !self.active,
            deactivated: !active && self.active,
        };

        self.position = position;
        self.active = active;
        if update.moved || update.activated {
            self.freshness = max_freshness;
        }
        update
    }

    /// Weaken the source by one, floored at zero
    pub fn decay(&mut self) {
        self.freshness = self.freshness.saturating_sub(1);
    }

    /// Write this cursor's freshness into its field if active
    pub fn inject(&self, field: &mut GradientField, map: &ObstacleMap) {
        if self.active {
            inject_cursor(field, map, self.position, self.freshness);
        }
    }
}

/// Overwrite the field at `cell` with `value`
///
/// Walls and off-map cells are left alone.
pub fn inject_cursor(field: &mut GradientField, map: &ObstacleMap, cell: CellCoord, value: u32) {
    if let Some(index) = map.free_index(cell) {
        field.set(index, value);
    }
}
