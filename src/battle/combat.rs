//! Combat resolution with allegiance transfer
//!
//! Particles never die. A defender pushed below zero health switches to the
//! attacker's faction and its health wraps back into `[0, max_health)`.

use std::sync::Mutex;

use crate::army::counts::FactionCounts;
use crate::army::particle::{lock_vitals, Vitals};
use crate::core::error::Result;
use crate::core::types::{FactionId, ParticleId};

/// Outcome of running into an occupied cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    /// Same faction, nothing happens
    Ally,
    /// Damage dealt; `captured` when the defender switched sides
    Fought { captured: bool },
}

/// Wrap any health value into `[0, max_health)`
#[inline]
pub fn restore_health(health: i32, max_health: i32) -> i32 {
    health.rem_euclid(max_health)
}

/// Apply one hit; returns the new health and whether the defender flips
#[inline]
pub fn apply_damage(health: i32, damage: i32, max_health: i32) -> (i32, bool) {
    let hit = health.saturating_sub(damage);
    if hit < 0 {
        (restore_health(hit, max_health), true)
    } else {
        (hit, false)
    }
}

/// Resolve `attacker` running into the cell held by `defender`
///
/// Both vitals locks are taken in particle-id order. The faction
/// comparison happens under the locks: a particle captured earlier this
/// tick fights for its new side.
pub fn engage(
    attacker: ParticleId,
    defender: ParticleId,
    vitals: &[Mutex<Vitals>],
    counts: &FactionCounts,
    damage: i32,
    max_health: i32,
) -> Result<Engagement> {
    if attacker == defender {
        return Ok(Engagement::Ally);
    }
    let (first, second) = if attacker < defender {
        (attacker, defender)
    } else {
        (defender, attacker)
    };
    let mut first_guard = lock_vitals(&vitals[first.index()])?;
    let mut second_guard = lock_vitals(&vitals[second.index()])?;
    let (attacker_vitals, defender_vitals) = if attacker < defender {
        (&mut *first_guard, &mut *second_guard)
    } else {
        (&mut *second_guard, &mut *first_guard)
    };

    if attacker_vitals.faction == defender_vitals.faction {
        return Ok(Engagement::Ally);
    }

    let (health, captured) = apply_damage(defender_vitals.health, damage, max_health);
    defender_vitals.health = health;
    if captured {
        let loser: FactionId = defender_vitals.faction;
        defender_vitals.faction = attacker_vitals.faction;
        counts.transfer(loser, attacker_vitals.faction);
    }

    Ok(Engagement::Fought { captured })
}
