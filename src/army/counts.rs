//! Live particle count per faction
//!
//! Updated from inside workers during a tick, so the counters are atomic.
//! A capture is always a paired increment/decrement, which keeps the sum
//! constant.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::types::FactionId;

#[derive(Debug)]
pub struct FactionCounts {
    counts: Vec<AtomicUsize>,
}

impl FactionCounts {
    pub fn new(faction_count: usize) -> Self {
        Self {
            counts: (0..faction_count).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Number of factions tracked
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, faction: FactionId) -> usize {
        self.counts
            .get(faction.index())
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn add(&self, faction: FactionId, amount: usize) {
        self.counts[faction.index()].fetch_add(amount, Ordering::Relaxed);
    }

    /// Move one particle's worth of count between factions
    pub fn transfer(&self, from: FactionId, to: FactionId) {
        self.counts[to.index()].fetch_add(1, Ordering::Relaxed);
        self.counts[from.index()].fetch_sub(1, Ordering::Relaxed);
    }

    /// Zero a faction's count, returning what it held
    pub fn take(&self, faction: FactionId) -> usize {
        self.counts[faction.index()].swap(0, Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Vec<usize> {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}
