//! Periodic healing of every particle

use rayon::prelude::*;
use std::sync::Mutex;

use crate::army::particle::{lock_vitals, Vitals};
use crate::core::error::Result;
use crate::core::types::Tick;

/// Whether `tick` closes a regeneration interval (0 disables)
#[inline]
pub fn is_regen_tick(tick: Tick, interval: u64) -> bool {
    interval > 0 && (tick + 1) % interval == 0
}

/// Heal every particle by `amount`, capped at `max_health - 1`
///
/// Returns the number of particles whose health went up.
pub fn regenerate(vitals: &[Mutex<Vitals>], amount: i32, max_health: i32) -> Result<usize> {
    let cap = max_health - 1;
    vitals
        .par_iter()
        .map(|v| -> Result<usize> {
            let mut v = lock_vitals(v)?;
            if v.health < cap {
                v.health = v.health.saturating_add(amount).min(cap);
                Ok(1)
            } else {
                Ok(0)
            }
        })
        .sum()
}
