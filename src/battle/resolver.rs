//! Movement and combat resolution
//!
//! Every particle gets exactly one action per tick:
//!
//! - **Direction**: near its cursor a particle steers straight at it through
//!   the compass table; far away it descends its faction's gradient field.
//!   Inactive cursors and flat neighborhoods fall back to a clock direction.
//! - **Move attempt**: the chosen direction first, then four alternates.
//!   Walls and off-map cells are skipped, allies are stepped around, the
//!   first enemy met is fought instead of moving.
//!
//! A tick resolves in three passes. `plan_chunk` decides every particle's
//! intent against occupancy and vitals as they stood when the tick began,
//! bidding on empty cells. `apply_moves` carries out the winning bids.
//! `settle` then lands hits one at a time in particle-id order. Nothing a
//! worker writes is read by another worker in the same pass, so the outcome
//! is the same for any pool size and any chunking.
//!
//! A particle's preferred start direction and table parity come from a spin
//! counter derived from the tick and the particle id. Neighboring particles
//! therefore scan in different orders, which breaks up grid-aligned flow.
//!
//! At most one cell lock is held at a time, and never while taking a
//! vitals lock.

use std::sync::Mutex;

use crate::army::counts::FactionCounts;
use crate::army::particle::{lock_vitals, Vitals};
use crate::battle::combat::{engage, Engagement};
use crate::battle::constants::{MOVE_CANDIDATES, SPIN_TICK_STRIDE, START_DIRECTION_STRIDE};
use crate::battle::occupancy::{ClaimBoard, Occupancy};
use crate::core::error::Result;
use crate::core::types::{CellCoord, FactionId, ParticleId, Tick};
use crate::field::cursor::Cursor;
use crate::field::gradient::GradientField;
use crate::field::proximity::ProximityMap;
use crate::map::direction::{compass_code, compass_direction, Direction, DIRECTION_COUNT};
use crate::map::obstacle_map::ObstacleMap;

/// Everything a worker reads or locks while resolving its chunk
///
/// Fields, proximity and cursors are read-only for the whole tick.
/// Occupancy, claims, vitals and counts are shared mutable state behind
/// locks or atomics.
pub struct ResolveContext<'a> {
    pub map: &'a ObstacleMap,
    pub fields: &'a [GradientField],
    pub proximity: &'a [ProximityMap],
    pub cursors: &'a [Cursor],
    pub occupancy: &'a Occupancy,
    pub claims: &'a ClaimBoard,
    pub vitals: &'a [Mutex<Vitals>],
    pub counts: &'a FactionCounts,
    pub tick: Tick,
    pub attack_damage: i32,
    pub max_health: i32,
}

/// Per-particle desynchronization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spin {
    pub start: Direction,
    pub parity: usize,
}

impl Spin {
    pub fn for_particle(tick: Tick, id: ParticleId) -> Self {
        let counter = tick
            .wrapping_mul(SPIN_TICK_STRIDE)
            .wrapping_add(id.0 as u64);
        let start = counter.wrapping_mul(START_DIRECTION_STRIDE) % DIRECTION_COUNT as u64;
        Self {
            start: Direction::from_index(start as usize),
            // Bit 1, so parity is not tied to the start direction's low bit.
            parity: ((counter >> 1) & 1) as usize,
        }
    }
}

/// How a particle's direction was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steering {
    Direct(Direction),
    Gradient(Direction),
    Clock(Direction),
}

impl Steering {
    pub fn direction(self) -> Direction {
        match self {
            Steering::Direct(d) | Steering::Gradient(d) | Steering::Clock(d) => d,
        }
    }
}

/// What a particle means to do, decided before anything moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Intent {
    /// Not planned this tick (its chunk failed)
    #[default]
    Idle,
    /// Step into the empty cell at this index if no lower id bid for it
    Claim(usize),
    /// Hit the enemy holding the target cell
    Attack(ParticleId),
    /// Every candidate was a wall, off the map or held by an ally
    Blocked,
}

/// What a particle did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Moved(CellCoord),
    Fought { captured: bool },
    Blocked,
}

/// Counters for one resolved chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub moved: usize,
    pub fought: usize,
    pub captured: usize,
    pub blocked: usize,
    pub direct: usize,
    pub gradient: usize,
}

impl ChunkStats {
    pub fn merge(mut self, other: ChunkStats) -> ChunkStats {
        self.moved += other.moved;
        self.fought += other.fought;
        self.captured += other.captured;
        self.blocked += other.blocked;
        self.direct += other.direct;
        self.gradient += other.gradient;
        self
    }

    pub fn record_steering(&mut self, steering: Steering) {
        match steering {
            Steering::Direct(_) => self.direct += 1,
            Steering::Gradient(_) => self.gradient += 1,
            Steering::Clock(_) => {}
        }
    }

    pub fn record(&mut self, action: Action) {
        match action {
            Action::Moved(_) => self.moved += 1,
            Action::Fought { captured } => {
                self.fought += 1;
                if captured {
                    self.captured += 1;
                }
            }
            Action::Blocked => self.blocked += 1,
        }
    }
}

/// Fallback direction driven by the global tick
#[inline]
pub fn clock_direction(tick: Tick) -> Direction {
    Direction::from_index((tick % DIRECTION_COUNT as u64) as usize)
}

/// Plan every particle of one contiguous chunk
///
/// `intents[i]` belongs to particle `first_id + i`. `positions` is the whole
/// pool and is not written during planning.
pub fn plan_chunk(
    ctx: &ResolveContext<'_>,
    first_id: usize,
    positions: &[CellCoord],
    intents: &mut [Intent],
) -> Result<ChunkStats> {
    intents.fill(Intent::Idle);
    let mut stats = ChunkStats::default();
    for (offset, intent) in intents.iter_mut().enumerate() {
        let id = ParticleId::from_index(first_id + offset);
        let (steering, planned) = plan_particle(ctx, id, positions[id.index()])?;
        stats.record_steering(steering);
        *intent = planned;
    }
    Ok(stats)
}

/// Pick a direction and an intent for a single particle
pub fn plan_particle(
    ctx: &ResolveContext<'_>,
    id: ParticleId,
    position: CellCoord,
) -> Result<(Steering, Intent)> {
    let faction = lock_vitals(&ctx.vitals[id.index()])?.faction;
    let spin = Spin::for_particle(ctx.tick, id);
    let steering = choose_direction(ctx, faction, position, spin);
    let intent = plan_move(ctx, id, faction, position, steering.direction(), spin.parity)?;
    Ok((steering, intent))
}

/// Direct mode near the cursor, gradient descent elsewhere
pub fn choose_direction(
    ctx: &ResolveContext<'_>,
    faction: FactionId,
    cell: CellCoord,
    spin: Spin,
) -> Steering {
    let clock = Steering::Clock(clock_direction(ctx.tick));
    let Some(cursor) = ctx.cursors.get(faction.index()) else {
        return clock;
    };
    if !cursor.active {
        return clock;
    }
    let Some(index) = ctx.map.index_of(cell) else {
        return clock;
    };

    if ctx.proximity[faction.index()].is_near(index) {
        return compass_direction(compass_code(cell, cursor.position), spin.parity)
            .map(Steering::Direct)
            .unwrap_or(clock);
    }

    descend_gradient(&ctx.fields[faction.index()], ctx.map, index, cell, spin)
        .map(Steering::Gradient)
        .unwrap_or(clock)
}

/// Lowest neighbor strictly below the current cell
///
/// Scans all twelve directions from the spin's start direction, clockwise
/// on even parity and counter-clockwise on odd. Ties keep the first found.
fn descend_gradient(
    field: &GradientField,
    map: &ObstacleMap,
    index: usize,
    cell: CellCoord,
    spin: Spin,
) -> Option<Direction> {
    let mut best = field.value(index);
    let mut chosen = None;
    let start = spin.start.index();

    for step in 0..DIRECTION_COUNT {
        let dir = if spin.parity == 0 {
            Direction::from_index(start + step)
        } else {
            Direction::from_index(start + DIRECTION_COUNT - step)
        };
        let Some(neighbor) = map.free_index(dir.step(cell)) else {
            continue;
        };
        let value = field.value(neighbor);
        if value < best {
            best = value;
            chosen = Some(dir);
        }
    }
    chosen
}

/// Walk the primary direction and its alternates until one is usable
///
/// An empty cell gets a bid on the claim board. Allies are stepped around;
/// the first enemy met becomes the attack target.
pub fn plan_move(
    ctx: &ResolveContext<'_>,
    id: ParticleId,
    faction: FactionId,
    from: CellCoord,
    primary: Direction,
    parity: usize,
) -> Result<Intent> {
    let candidates = std::iter::once(primary)
        .chain(primary.alternates(parity).iter().copied())
        .take(MOVE_CANDIDATES);

    for dir in candidates {
        let Some(target) = ctx.map.free_index(dir.step(from)) else {
            continue;
        };
        match ctx.occupancy.occupant(target)? {
            None => {
                ctx.claims.offer(target, id);
                return Ok(Intent::Claim(target));
            }
            Some(occupant) => {
                if lock_vitals(&ctx.vitals[occupant.index()])?.faction != faction {
                    return Ok(Intent::Attack(occupant));
                }
            }
        }
    }

    Ok(Intent::Blocked)
}

/// Carry out the winning bids of one chunk
///
/// `positions[i]` belongs to particle `first_id + i`. A bid cell was empty
/// when the tick began and has a single winner, so no two workers write the
/// same cell. Losing bidders stay where they are.
pub fn apply_moves(
    ctx: &ResolveContext<'_>,
    first_id: usize,
    positions: &mut [CellCoord],
    intents: &[Intent],
) -> Result<ChunkStats> {
    let mut stats = ChunkStats::default();
    for (offset, position) in positions.iter_mut().enumerate() {
        let id = ParticleId::from_index(first_id + offset);
        match intents[id.index()] {
            Intent::Claim(target) if ctx.claims.winner(target) == Some(id) => {
                *ctx.occupancy.lock(target)? = Some(id);
                if let Some(from) = ctx.map.index_of(*position) {
                    let mut old = ctx.occupancy.lock(from)?;
                    if *old == Some(id) {
                        *old = None;
                    }
                }
                *position = ctx.map.coord_of(target);
                stats.record(Action::Moved(*position));
            }
            Intent::Claim(_) | Intent::Blocked => stats.record(Action::Blocked),
            Intent::Attack(_) | Intent::Idle => {}
        }
    }
    Ok(stats)
}

/// Finish one particle's tick once every move is in
///
/// Runs on one thread in particle-id order. A bid is wiped from the claim
/// board; an attack lands on the particle that held the target when the
/// tick began, even if it has moved since. A particle captured earlier in
/// the pass fights for its new side, and does nothing if that makes the
/// target an ally.
pub fn settle(ctx: &ResolveContext<'_>, id: ParticleId, intent: Intent) -> Result<Option<Action>> {
    match intent {
        Intent::Claim(target) => {
            ctx.claims.clear(target);
            Ok(None)
        }
        Intent::Attack(defender) => {
            let engagement = engage(
                id,
                defender,
                ctx.vitals,
                ctx.counts,
                ctx.attack_damage,
                ctx.max_health,
            )?;
            Ok(Some(match engagement {
                Engagement::Ally => Action::Blocked,
                Engagement::Fought { captured } => Action::Fought { captured },
            }))
        }
        Intent::Idle | Intent::Blocked => Ok(None),
    }
}
