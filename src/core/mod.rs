pub mod config;
pub mod error;
pub mod types;

pub use config::MatchConfig;
pub use error::{Result, TidewarError};
pub use types::{CellCoord, FactionId, ParticleId, Tick, MAX_FACTIONS, MAX_PARTICLES, MIN_FACTIONS};
