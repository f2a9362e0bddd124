//! Tidewar - particle armies flowing over an obstacle grid
//!
//! Each faction steers thousands of particles toward its cursor through a
//! wave-propagated gradient field. Particles that run into enemies fight,
//! and the loser switches sides, so the total never changes.

pub mod army;
pub mod battle;
pub mod core;
pub mod field;
pub mod map;
pub mod simulation;

pub use crate::core::{MatchConfig, Result, TidewarError};
pub use crate::simulation::{Match, MatchSnapshot, TickReport};
