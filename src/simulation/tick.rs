//! Tick system - the match state object and its per-tick update
//!
//! One tick runs these phases in order:
//! inject cursors -> decay freshness -> propagate fields -> resolve particles
//! -> regeneration.
//!
//! Field propagation runs one faction per worker; particle resolution runs
//! one chunk per worker. Both happen inside the coordinator's pool and the
//! call returns only when every worker is done. Given the same start state
//! and cursor inputs, a tick ends in the same state for any worker count.

use serde::{Deserialize, Serialize};

use crate::army::counts::FactionCounts;
use crate::army::particle::{Particle, ParticlePool};
use crate::army::spawn::{spawn_armies, SpawnPlan};
use crate::battle::occupancy::{ClaimBoard, Occupancy};
use crate::battle::regeneration::{is_regen_tick, regenerate};
use crate::battle::resolver::{Intent, ResolveContext};
use crate::core::config::MatchConfig;
use crate::core::error::{Result, TidewarError};
use crate::core::types::{CellCoord, FactionId, ParticleId, Tick, MAX_FACTIONS, MIN_FACTIONS};
use crate::field::cursor::Cursor;
use crate::field::gradient::GradientField;
use crate::field::propagation::propagate_all;
use crate::field::proximity::ProximityMap;
use crate::map::obstacle_map::ObstacleMap;
use crate::simulation::coordinator::Coordinator;
use crate::simulation::fork_join::RayonJoin;

/// Aggregated outcome of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick that was just simulated
    pub tick: Tick,
    pub moved: usize,
    pub fought: usize,
    /// Fights that flipped the defender's allegiance
    pub captured: usize,
    pub blocked: usize,
    /// Particles that steered straight at their cursor
    pub direct: usize,
    /// Particles that followed their gradient
    pub gradient: usize,
    /// Field cells lowered by propagation, all factions
    pub lowered: usize,
    /// Particles healed by regeneration
    pub healed: usize,
}

/// A running match: map, fields, cursors, particles and live counts
pub struct Match {
    config: MatchConfig,
    map: ObstacleMap,
    fields: Vec<GradientField>,
    proximity: Vec<ProximityMap>,
    cursors: Vec<Cursor>,
    particles: ParticlePool,
    occupancy: Occupancy,
    claims: ClaimBoard,
    intents: Vec<Intent>,
    counts: FactionCounts,
    coordinator: Coordinator,
    tick: Tick,
    total_spawned: usize,
    removed: usize,
}

impl Match {
    /// Set up a match and spawn every army
    ///
    /// All cursors start inactive at the origin.
    pub fn new(
        map: ObstacleMap,
        faction_count: usize,
        plans: &[SpawnPlan],
        config: MatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !(MIN_FACTIONS..=MAX_FACTIONS).contains(&faction_count) {
            return Err(TidewarError::FactionCount(faction_count));
        }
        if let Some(plan) = plans.iter().find(|p| p.faction.index() >= faction_count) {
            return Err(TidewarError::UnknownFaction(plan.faction));
        }

        let particles = spawn_armies(&map, plans, config.max_health - 1)?;
        let occupancy = Occupancy::from_positions(&map, particles.positions())?;
        let coordinator = Coordinator::new(config.worker_threads, config.chunk_count)?;

        let counts = FactionCounts::new(faction_count);
        let tally = coordinator.install(|| particles.tally(&RayonJoin, faction_count))?;
        for (faction, count) in tally.iter().enumerate() {
            counts.add(FactionId(faction as u8), *count);
        }

        tracing::info!(
            width = map.width(),
            height = map.height(),
            factions = faction_count,
            particles = particles.len(),
            workers = coordinator.workers(),
            "Match created"
        );

        Ok(Self {
            fields: (0..faction_count).map(|_| GradientField::new(&map)).collect(),
            proximity: (0..faction_count).map(|_| ProximityMap::new(&map)).collect(),
            cursors: vec![Cursor::default(); faction_count],
            claims: ClaimBoard::new(map.len()),
            intents: vec![Intent::Idle; particles.len()],
            total_spawned: particles.len(),
            removed: 0,
            tick: 0,
            particles,
            occupancy,
            counts,
            coordinator,
            config,
            map,
        })
    }

    fn check_faction(&self, faction: FactionId) -> Result<usize> {
        if faction.index() < self.cursors.len() {
            Ok(faction.index())
        } else {
            Err(TidewarError::UnknownFaction(faction))
        }
    }

    /// Update one faction's cursor from the outside world
    ///
    /// Moving or activating refreshes the proximity markers. Deactivating
    /// marks every cell far and, with `remove_on_deactivate`, removes the
    /// faction's particles outright.
    pub fn set_cursor(&mut self, faction: FactionId, cell: CellCoord, active: bool) -> Result<()> {
        let index = self.check_faction(faction)?;
        if !self.map.in_bounds(cell) {
            return Err(TidewarError::OutOfBounds(cell));
        }

        let update = self.cursors[index].update(cell, active, self.config.cursor_max_freshness);
        if active && (update.moved || update.activated) {
            self.proximity[index].refresh(&self.map, cell, self.config.proximity_radius);
        }
        if update.deactivated {
            self.proximity[index].clear();
            if self.config.remove_on_deactivate {
                self.remove_faction(faction)?;
            }
        }
        Ok(())
    }

    /// Drop every particle of `faction` (count conservation is broken here)
    fn remove_faction(&mut self, faction: FactionId) -> Result<usize> {
        let removed = self.particles.remove_faction(faction)?;
        self.counts.take(faction);
        self.occupancy = Occupancy::from_positions(&self.map, self.particles.positions())?;
        self.removed += removed;
        tracing::warn!(
            %faction,
            removed,
            remaining = self.particles.len(),
            "Cursor deactivated, faction removed from the match"
        );
        Ok(removed)
    }

    /// Run one full tick
    ///
    /// When a worker fails the tick still counts as advanced and nothing is
    /// rolled back; the failures come back as `TickPartiallyApplied`.
    pub fn advance_tick(&mut self) -> Result<TickReport> {
        let tick = self.tick;

        for (cursor, field) in self.cursors.iter_mut().zip(self.fields.iter_mut()) {
            cursor.inject(field, &self.map);
            if cursor.active {
                cursor.decay();
            }
        }

        let fields = &mut self.fields;
        let map = &self.map;
        let cell_cost = self.config.cell_cost;
        let lowered = self
            .coordinator
            .install(|| propagate_all(fields, map, tick, cell_cost));

        self.intents.resize(self.particles.len(), Intent::Idle);
        let (positions, vitals) = self.particles.split_mut();
        let ctx = ResolveContext {
            map: &self.map,
            fields: &self.fields,
            proximity: &self.proximity,
            cursors: &self.cursors,
            occupancy: &self.occupancy,
            claims: &self.claims,
            vitals,
            counts: &self.counts,
            tick,
            attack_damage: self.config.attack_damage,
            max_health: self.config.max_health,
        };
        let outcome = self.coordinator.resolve(&ctx, positions, &mut self.intents);
        let mut failures = outcome.failures;

        let mut healed = 0;
        if is_regen_tick(tick, self.config.regen_interval) {
            let vitals = self.particles.vitals();
            let (amount, max_health) = (self.config.regen_amount, self.config.max_health);
            match self
                .coordinator
                .install(|| regenerate(vitals, amount, max_health))
            {
                Ok(count) => healed = count,
                Err(e) => {
                    tracing::error!(tick, error = %e, "Regeneration failed");
                    failures.push(e);
                }
            }
        }

        self.tick += 1;

        if !failures.is_empty() {
            return Err(TidewarError::TickPartiallyApplied { tick, failures });
        }

        let stats = outcome.stats;
        let report = TickReport {
            tick,
            moved: stats.moved,
            fought: stats.fought,
            captured: stats.captured,
            blocked: stats.blocked,
            direct: stats.direct,
            gradient: stats.gradient,
            lowered,
            healed,
        };
        tracing::debug!(
            tick,
            moved = report.moved,
            fought = report.fought,
            captured = report.captured,
            blocked = report.blocked,
            lowered,
            "Tick complete"
        );
        Ok(report)
    }

    /// Recount the pool and check it against the live counters
    ///
    /// True when per-faction tallies match the counters, their sum equals
    /// `total_spawned - removed`, and every particle holds exactly one cell.
    pub fn audit_counts(&self) -> Result<bool> {
        let faction_count = self.counts.len();
        let tally = self
            .coordinator
            .install(|| self.particles.tally(&RayonJoin, faction_count))?;
        let live = self.counts.snapshot();
        let expected_total = self.total_spawned - self.removed;
        let occupied = self.occupancy.occupied()?;

        Ok(tally == live
            && live.iter().sum::<usize>() == expected_total
            && occupied == self.particles.len())
    }

    /// Live per-faction particle counts
    pub fn counts(&self) -> Vec<usize> {
        self.counts.snapshot()
    }

    pub fn count(&self, faction: FactionId) -> usize {
        self.counts.get(faction)
    }

    pub fn faction_count(&self) -> usize {
        self.cursors.len()
    }

    /// Next tick to be simulated
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn total_spawned(&self) -> usize {
        self.total_spawned
    }

    /// Particles removed through cursor deactivation
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Raw field of one faction, for debugging and visualization
    pub fn gradient(&self, faction: FactionId) -> Result<&GradientField> {
        let index = self.check_faction(faction)?;
        Ok(&self.fields[index])
    }

    pub fn cursor(&self, faction: FactionId) -> Result<&Cursor> {
        let index = self.check_faction(faction)?;
        Ok(&self.cursors[index])
    }

    /// Copy of every particle, for renderers
    pub fn particles(&self) -> Result<Vec<Particle>> {
        self.particles.snapshot()
    }

    pub fn particle(&self, id: ParticleId) -> Result<Option<Particle>> {
        self.particles.get(id)
    }

    pub fn particle_pool(&self) -> &ParticlePool {
        &self.particles
    }

    pub fn map(&self) -> &ObstacleMap {
        &self.map
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn workers(&self) -> usize {
        self.coordinator.workers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_faction_match(config: MatchConfig) -> Match {
        let map = ObstacleMap::open(8, 8).unwrap();
        let plans = [
            SpawnPlan::cluster(FactionId(0), 3, CellCoord::new(1, 1)),
            SpawnPlan::cluster(FactionId(1), 3, CellCoord::new(6, 6)),
        ];
        Match::new(map, 2, &plans, config).unwrap()
    }

    #[test]
    fn test_new_counts_spawned_particles() {
        let m = two_faction_match(MatchConfig::default());
        assert_eq!(m.counts(), vec![3, 3]);
        assert_eq!(m.total_spawned(), 6);
        assert_eq!(m.tick(), 0);
        assert!(m.audit_counts().unwrap());
        let p = m.particle(ParticleId(0)).unwrap().unwrap();
        assert_eq!(p.health, m.config().max_health - 1);
    }

    #[test]
    fn test_rejects_bad_faction_counts() {
        let map = ObstacleMap::open(4, 4).unwrap();
        let result = Match::new(map.clone(), 5, &[], MatchConfig::default());
        assert!(matches!(result, Err(TidewarError::FactionCount(5))));

        let plans = [SpawnPlan::cluster(FactionId(2), 1, CellCoord::new(0, 0))];
        let result = Match::new(map, 2, &plans, MatchConfig::default());
        assert!(matches!(result, Err(TidewarError::UnknownFaction(FactionId(2)))));
    }

    #[test]
    fn test_set_cursor_validates_input() {
        let mut m = two_faction_match(MatchConfig::default());
        assert!(matches!(
            m.set_cursor(FactionId(0), CellCoord::new(8, 0), true),
            Err(TidewarError::OutOfBounds(_))
        ));
        assert!(matches!(
            m.set_cursor(FactionId(3), CellCoord::new(0, 0), true),
            Err(TidewarError::UnknownFaction(_))
        ));
    }

    #[test]
    fn test_cursor_injects_then_decays() {
        let config = MatchConfig {
            cursor_max_freshness: 500,
            ..Default::default()
        };
        let mut m = two_faction_match(config);
        m.set_cursor(FactionId(0), CellCoord::new(4, 4), true).unwrap();

        m.advance_tick().unwrap();
        let field = m.gradient(FactionId(0)).unwrap();
        assert_eq!(field.value_at(CellCoord::new(4, 4)), Some(500));
        assert_eq!(m.cursor(FactionId(0)).unwrap().freshness, 499);

        m.advance_tick().unwrap();
        let field = m.gradient(FactionId(0)).unwrap();
        assert_eq!(field.value_at(CellCoord::new(4, 4)), Some(499));
        assert_eq!(m.tick(), 2);
    }

    #[test]
    fn test_inactive_cursor_leaves_field_alone() {
        let mut m = two_faction_match(MatchConfig::default());
        for _ in 0..5 {
            m.advance_tick().unwrap();
        }
        assert_eq!(m.gradient(FactionId(1)).unwrap().reached_cells(), 0);
    }

    #[test]
    fn test_counts_conserved_under_contact() {
        let config = MatchConfig {
            attack_damage: 400,
            ..Default::default()
        };
        let mut m = two_faction_match(config);
        m.set_cursor(FactionId(0), CellCoord::new(6, 6), true).unwrap();
        m.set_cursor(FactionId(1), CellCoord::new(1, 1), true).unwrap();
        for _ in 0..60 {
            m.advance_tick().unwrap();
            assert_eq!(m.counts().iter().sum::<usize>(), 6);
        }
        assert!(m.audit_counts().unwrap());
    }

    #[test]
    fn test_deactivation_keeps_particles_by_default() {
        let mut m = two_faction_match(MatchConfig::default());
        m.set_cursor(FactionId(1), CellCoord::new(6, 6), true).unwrap();
        m.set_cursor(FactionId(1), CellCoord::new(6, 6), false).unwrap();
        assert_eq!(m.counts(), vec![3, 3]);
        assert_eq!(m.removed(), 0);
    }

    #[test]
    fn test_deactivation_removal_is_opt_in() {
        let config = MatchConfig {
            remove_on_deactivate: true,
            ..Default::default()
        };
        let mut m = two_faction_match(config);
        m.set_cursor(FactionId(0), CellCoord::new(1, 1), true).unwrap();
        m.set_cursor(FactionId(0), CellCoord::new(1, 1), false).unwrap();

        assert_eq!(m.counts(), vec![0, 3]);
        assert_eq!(m.removed(), 3);
        assert_eq!(m.particles().unwrap().len(), 3);
        assert!(m.audit_counts().unwrap());
        m.advance_tick().unwrap();
        assert!(m.audit_counts().unwrap());
    }
}
