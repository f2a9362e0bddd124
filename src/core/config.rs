//! Match configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. Configs can be loaded from TOML;
//! missing keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, TidewarError};
use crate::field::gradient::UNREACHED;

/// Configuration for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    // === COMBAT ===
    /// Exclusive upper bound of particle health
    ///
    /// Health always lives in `[0, max_health)`. Freshly spawned particles
    /// start at `max_health - 1`.
    pub max_health: i32,

    /// Damage dealt by one combat action
    ///
    /// At the defaults (1024 / 96) a full-health defender survives ten hits
    /// and flips on the eleventh.
    pub attack_damage: i32,

    /// Ticks between regeneration passes (0 disables regeneration)
    pub regen_interval: u64,

    /// Health restored per regeneration pass, capped at `max_health - 1`
    ///
    /// Slow enough that a sustained attack always wins: 8 health every
    /// 4 ticks against 96 damage per hit.
    pub regen_amount: i32,

    // === GRADIENT FIELD ===
    /// Cost added per propagation step
    ///
    /// Must exceed the freshness decay accumulated over one 12-tick rotation
    /// (12) for field values to stay monotone in distance from a static cursor.
    pub cell_cost: u32,

    /// Freshness value injected right after a cursor moves
    ///
    /// Decays by 1 per tick toward 0 while the cursor stays put.
    pub cursor_max_freshness: u32,

    /// Chebyshev radius around a cursor inside which particles steer directly
    ///
    /// Inside this radius the field is ignored, giving immediate response
    /// to fast cursor motion. Outside, particles descend the gradient.
    pub proximity_radius: u32,

    // === PARALLELIZATION ===
    /// Number of contiguous particle chunks handed to workers each tick
    pub chunk_count: usize,

    /// Size of the worker pool (`None` = rayon's default, one per core)
    pub worker_threads: Option<usize>,

    // === OPEN QUESTION BEHAVIOR ===
    /// Remove all of a faction's particles the moment its cursor deactivates
    ///
    /// This breaks count conservation; it is kept as an explicit opt-in.
    pub remove_on_deactivate: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            // Combat
            max_health: 1024,
            attack_damage: 96,
            regen_interval: 4,
            regen_amount: 8,

            // Gradient
            cell_cost: 16,
            cursor_max_freshness: 1_000_000,
            proximity_radius: 6,

            // Parallelization
            chunk_count: 16,
            worker_threads: None,

            remove_on_deactivate: false,
        }
    }
}

impl MatchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MatchConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_health < 2 {
            return Err(TidewarError::InvalidConfig(format!(
                "max_health ({}) must be at least 2",
                self.max_health
            )));
        }

        if self.attack_damage <= 0 {
            return Err(TidewarError::InvalidConfig(format!(
                "attack_damage ({}) must be positive",
                self.attack_damage
            )));
        }

        if self.regen_amount < 0 {
            return Err(TidewarError::InvalidConfig(
                "regen_amount must not be negative".into(),
            ));
        }

        if self.cell_cost == 0 {
            return Err(TidewarError::InvalidConfig("cell_cost must be positive".into()));
        }

        if self.cursor_max_freshness >= UNREACHED {
            return Err(TidewarError::InvalidConfig(format!(
                "cursor_max_freshness ({}) must be below the unreached sentinel",
                self.cursor_max_freshness
            )));
        }

        if self.chunk_count == 0 {
            return Err(TidewarError::InvalidConfig("chunk_count must be positive".into()));
        }

        if self.worker_threads == Some(0) {
            return Err(TidewarError::InvalidConfig(
                "worker_threads must be positive when set".into(),
            ));
        }

        Ok(())
    }
}
