//! Battle resolution - movement, combat and regeneration of particles
//!
//! Particles never die: losing a fight flips allegiance, so every capture
//! is a count transfer between factions.

pub mod combat;
pub mod constants;
pub mod occupancy;
pub mod regeneration;
pub mod resolver;

// Re-exports for convenient access
pub use combat::{apply_damage, engage, restore_health, Engagement};
pub use constants::*;
pub use occupancy::{CellSlot, ClaimBoard, Occupancy};
pub use regeneration::{is_regen_tick, regenerate};
pub use resolver::{
    apply_moves, choose_direction, clock_direction, plan_chunk, plan_move, plan_particle, settle,
    Action, ChunkStats, Intent, ResolveContext, Spin, Steering,
};
