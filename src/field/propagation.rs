//! Rotating single-direction relaxation of gradient fields
//!
//! Each tick relaxes every field along exactly one of the twelve directions:
//! a cell takes `neighbor + cell_cost` when that beats its current value.
//! The direction advances by a stride of 7 (coprime with 12), so every
//! direction is visited once per 12 ticks. Cost is O(cells) per tick and the
//! field converges as expanding waves over roughly one rotation.
//!
//! Scan order follows the update direction: when the neighbor being read
//! lies later in row-major order the grid is scanned in reverse, so each
//! cell sees its already-updated neighbor and a value can travel across
//! many cells in a single pass.

use rayon::prelude::*;

use crate::core::types::Tick;
use crate::field::gradient::GradientField;
use crate::map::direction::{Direction, DIRECTION_COUNT};
use crate::map::obstacle_map::ObstacleMap;

/// Stride between consecutive sweep directions
pub const SWEEP_STRIDE: u64 = 7;

/// Direction relaxed on a given tick
#[inline]
pub fn sweep_direction(tick: Tick) -> Direction {
    Direction::from_index((tick.wrapping_mul(SWEEP_STRIDE) % DIRECTION_COUNT as u64) as usize)
}

/// One propagation sweep over a single field
///
/// Returns the number of cells whose value dropped.
pub fn propagate(field: &mut GradientField, map: &ObstacleMap, dir: Direction, cell_cost: u32) -> usize {
    let width = map.width() as i32;
    let height = map.height() as i32;
    let (dx, dy) = dir.offset();
    let values = field.values_mut();
    let mut lowered = 0;

    let mut relax = |x: i32, y: i32| {
        let index = (y * width + x) as usize;
        if map.is_blocked_index(index) {
            return;
        }
        let (nx, ny) = (x + dx, y + dy);
        if nx < 0 || ny < 0 || nx >= width || ny >= height {
            return;
        }
        let neighbor = (ny * width + nx) as usize;
        if map.is_blocked_index(neighbor) {
            return;
        }
        let candidate = values[neighbor].saturating_add(cell_cost);
        if candidate < values[index] {
            values[index] = candidate;
            lowered += 1;
        }
    };

    if dir.points_forward() {
        for y in (0..height).rev() {
            for x in (0..width).rev() {
                relax(x, y);
            }
        }
    } else {
        for y in 0..height {
            for x in 0..width {
                relax(x, y);
            }
        }
    }

    lowered
}

/// Sweep every faction's field for `tick`, one field per worker
pub fn propagate_all(fields: &mut [GradientField], map: &ObstacleMap, tick: Tick, cell_cost: u32) -> usize {
    let dir = sweep_direction(tick);
    fields
        .par_iter_mut()
        .map(|field| propagate(field, map, dir, cell_cost))
        .sum()
}
