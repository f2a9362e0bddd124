//! Particle pool - the mobile army entities
//!
//! Storage is split by who writes it during a tick. Positions are handed
//! out in contiguous chunks, one chunk per worker, and only the owning
//! worker touches them. Faction and health ("vitals") can be hit by an
//! enemy particle from any chunk, so each particle's vitals sit behind
//! their own lock.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::core::error::{Result, TidewarError};
use crate::core::types::{CellCoord, FactionId, ParticleId, MAX_FACTIONS};
use crate::simulation::fork_join::{split_reduce, ForkJoin};

/// Faction and health of one particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitals {
    pub faction: FactionId,
    pub health: i32,
}

/// Plain copy of a particle for renderers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    pub position: CellCoord,
    pub faction: FactionId,
    pub health: i32,
}

/// Lock one particle's vitals
#[inline]
pub fn lock_vitals(vitals: &Mutex<Vitals>) -> Result<MutexGuard<'_, Vitals>> {
    vitals
        .lock()
        .map_err(|_| TidewarError::LockPoisoned("particle vitals"))
}

// Leaf size for pool-wide reductions.
const TALLY_GRAIN: usize = 4096;

#[derive(Debug, Default)]
pub struct ParticlePool {
    positions: Vec<CellCoord>,
    vitals: Vec<Mutex<Vitals>>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            vitals: Vec::with_capacity(capacity),
        }
    }

    /// Append a particle; `spawn_armies` keeps pools under `MAX_PARTICLES`
    pub fn push(&mut self, position: CellCoord, faction: FactionId, health: i32) -> ParticleId {
        let id = ParticleId::from_index(self.positions.len());
        self.positions.push(position);
        self.vitals.push(Mutex::new(Vitals { faction, health }));
        id
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[CellCoord] {
        &self.positions
    }

    pub fn vitals(&self) -> &[Mutex<Vitals>] {
        &self.vitals
    }

    /// Positions for chunked mutation alongside shared vitals
    pub fn split_mut(&mut self) -> (&mut [CellCoord], &[Mutex<Vitals>]) {
        (&mut self.positions, &self.vitals)
    }

    /// Copy of one particle
    pub fn get(&self, id: ParticleId) -> Result<Option<Particle>> {
        let Some(position) = self.positions.get(id.index()) else {
            return Ok(None);
        };
        let vitals = *lock_vitals(&self.vitals[id.index()])?;
        Ok(Some(Particle {
            position: *position,
            faction: vitals.faction,
            health: vitals.health,
        }))
    }

    /// Copy of every particle, in pool order
    pub fn snapshot(&self) -> Result<Vec<Particle>> {
        self.positions
            .iter()
            .zip(&self.vitals)
            .map(|(position, vitals)| {
                let v = *lock_vitals(vitals)?;
                Ok(Particle {
                    position: *position,
                    faction: v.faction,
                    health: v.health,
                })
            })
            .collect()
    }

    /// Recount particles per faction with a fork-join reduction
    pub fn tally<E: ForkJoin>(&self, executor: &E, faction_count: usize) -> Result<Vec<usize>> {
        let leaf = |chunk: &[Mutex<Vitals>]| -> Result<[usize; MAX_FACTIONS]> {
            let mut counts = [0usize; MAX_FACTIONS];
            for vitals in chunk {
                let faction = lock_vitals(vitals)?.faction.index();
                if let Some(slot) = counts.get_mut(faction) {
                    *slot += 1;
                }
            }
            Ok(counts)
        };
        let combine = |a: Result<[usize; MAX_FACTIONS]>,
                       b: Result<[usize; MAX_FACTIONS]>|
         -> Result<[usize; MAX_FACTIONS]> {
            let (mut a, b) = (a?, b?);
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
            Ok(a)
        };
        let counts = split_reduce(executor, &self.vitals, TALLY_GRAIN, &leaf, &combine)?;
        Ok(counts[..faction_count.min(MAX_FACTIONS)].to_vec())
    }

    /// Drop every particle of `faction`, keeping the others in order
    ///
    /// Particle ids after the first removed one shift down.
    pub fn remove_faction(&mut self, faction: FactionId) -> Result<usize> {
        let mut keep = Vec::with_capacity(self.vitals.len());
        for vitals in &self.vitals {
            keep.push(lock_vitals(vitals)?.faction != faction);
        }

        let before = self.positions.len();
        let positions = std::mem::take(&mut self.positions);
        let vitals = std::mem::take(&mut self.vitals);
        for ((position, v), kept) in positions.into_iter().zip(vitals).zip(keep) {
            if kept {
                self.positions.push(position);
                self.vitals.push(v);
            }
        }
        Ok(before - self.positions.len())
    }
}
