//! Which particle stands on each cell, and who bid for it this tick
//!
//! One lock per cell keeps moves from different workers apart without
//! serializing the tick. Workers never hold two cell locks at once.
//!
//! Bids for empty cells go on a separate `ClaimBoard`. The lowest bidding
//! id wins, and `fetch_min` gives the same winner whatever order the bids
//! arrive in.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::core::error::{Result, TidewarError};
use crate::core::types::{CellCoord, ParticleId};
use crate::map::obstacle_map::ObstacleMap;

pub type CellSlot<'a> = MutexGuard<'a, Option<ParticleId>>;

#[derive(Debug)]
pub struct Occupancy {
    cells: Vec<Mutex<Option<ParticleId>>>,
}

impl Occupancy {
    /// Empty occupancy for `cells` cells
    pub fn new(cells: usize) -> Self {
        Self {
            cells: (0..cells).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Occupancy built from particle positions (index = particle id)
    pub fn from_positions(map: &ObstacleMap, positions: &[CellCoord]) -> Result<Self> {
        let mut cells: Vec<Option<ParticleId>> = vec![None; map.len()];
        for (i, position) in positions.iter().enumerate() {
            let index = map
                .free_index(*position)
                .ok_or(TidewarError::OutOfBounds(*position))?;
            if let Some(other) = cells[index] {
                return Err(TidewarError::InvalidMap(format!(
                    "particles {} and {} share cell {}",
                    other.0, i, position
                )));
            }
            cells[index] = Some(ParticleId::from_index(i));
        }
        Ok(Self {
            cells: cells.into_iter().map(Mutex::new).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Lock one cell
    #[inline]
    pub fn lock(&self, index: usize) -> Result<CellSlot<'_>> {
        self.cells[index]
            .lock()
            .map_err(|_| TidewarError::LockPoisoned("occupancy cell"))
    }

    pub fn occupant(&self, index: usize) -> Result<Option<ParticleId>> {
        Ok(*self.lock(index)?)
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> Result<usize> {
        let mut count = 0;
        for index in 0..self.cells.len() {
            if self.occupant(index)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}

const NO_CLAIM: u32 = u32::MAX;

/// Per-cell lowest bidder for the current tick
#[derive(Debug)]
pub struct ClaimBoard {
    cells: Vec<AtomicU32>,
}

impl ClaimBoard {
    pub fn new(cells: usize) -> Self {
        Self {
            cells: (0..cells).map(|_| AtomicU32::new(NO_CLAIM)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bid for a cell
    #[inline]
    pub fn offer(&self, index: usize, id: ParticleId) {
        self.cells[index].fetch_min(id.0, Ordering::Relaxed);
    }

    /// Lowest bidder so far
    #[inline]
    pub fn winner(&self, index: usize) -> Option<ParticleId> {
        match self.cells[index].load(Ordering::Relaxed) {
            NO_CLAIM => None,
            id => Some(ParticleId(id)),
        }
    }

    #[inline]
    pub fn clear(&self, index: usize) {
        self.cells[index].store(NO_CLAIM, Ordering::Relaxed);
    }

    /// Wipe every bid, for ticks that did not finish cleanly
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(NO_CLAIM, Ordering::Relaxed);
        }
    }
}
