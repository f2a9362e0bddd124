//! Armies - the particle pool, live faction counts and initial placement

pub mod counts;
pub mod particle;
pub mod spawn;

pub use counts::FactionCounts;
pub use particle::{lock_vitals, Particle, ParticlePool, Vitals};
pub use spawn::{spawn_armies, SpawnLayout, SpawnPlan};
