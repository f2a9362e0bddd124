//! Resolver constants - fixed stepping values in one place
//!
//! Tunable gameplay numbers (damage, health, regeneration) live in
//! `MatchConfig`; these are structural and not meant to be tuned.

// Per-particle desynchronization. The spin counter advances by one per
// particle and by SPIN_TICK_STRIDE per tick; the preferred start direction
// advances by START_DIRECTION_STRIDE per spin step. Both strides are coprime
// with the direction count so every start direction comes round.
pub const SPIN_TICK_STRIDE: u64 = 7;
pub const START_DIRECTION_STRIDE: u64 = 5;

// Candidate directions per move attempt: the chosen one plus alternates.
pub const MOVE_CANDIDATES: usize = 5;
