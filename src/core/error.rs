use thiserror::Error;

use crate::core::types::{CellCoord, FactionId, Tick};

#[derive(Error, Debug)]
pub enum TidewarError {
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unsupported faction count: {0} (expected 2..=4)")]
    FactionCount(usize),

    #[error("Unknown faction: {0}")]
    UnknownFaction(FactionId),

    #[error("Cell out of bounds: {0}")]
    OutOfBounds(CellCoord),

    #[error("Spawn for {faction} placed {placed} of {requested} particles")]
    SpawnCapacity {
        faction: FactionId,
        requested: usize,
        placed: usize,
    },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Worker for chunk {chunk} panicked: {message}")]
    WorkerPanicked { chunk: usize, message: String },

    #[error("Tick {tick} partially applied, {} chunk(s) failed", failures.len())]
    TickPartiallyApplied {
        tick: Tick,
        failures: Vec<TidewarError>,
    },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TidewarError>;
