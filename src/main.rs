//! Headless Match Runner
//!
//! Spawns one army per corner of a random obstacle map, drives every cursor
//! with a scripted policy and prints a summary when the run ends.
//!
//! The scripted policy holds each cursor on its army for a while, then walks
//! it one cell per tick toward the map centre, where the armies collide.

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use tidewar::army::SpawnPlan;
use tidewar::core::{CellCoord, FactionId, MatchConfig, Result, TidewarError};
use tidewar::map::ObstacleMap;
use tidewar::simulation::Match;

/// Headless Tidewar runner - scripted cursors, JSON or text summary
#[derive(Parser, Debug)]
#[command(name = "tidewar")]
#[command(about = "Run a headless particle battle and report faction counts")]
struct Args {
    /// Map width in cells
    #[arg(long, default_value_t = 160)]
    width: usize,

    /// Map height in cells
    #[arg(long, default_value_t = 120)]
    height: usize,

    /// Number of factions (2-4)
    #[arg(long, default_value_t = 2)]
    factions: usize,

    /// Particles spawned per faction
    #[arg(long, default_value_t = 2000)]
    particles: usize,

    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Ticks each cursor holds still before heading for the centre
    #[arg(long, default_value_t = 60)]
    hold: u64,

    /// Fraction of cells turned into obstacles
    #[arg(long, default_value_t = 0.04)]
    obstacles: f64,

    /// Worker threads (overrides the config file)
    #[arg(long)]
    workers: Option<usize>,

    /// Random seed for deterministic maps
    #[arg(long)]
    seed: Option<u64>,

    /// Match config (TOML); missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    width: usize,
    height: usize,
    ticks: u64,
    workers: usize,
    total_spawned: usize,
    final_counts: Vec<usize>,
    moved: usize,
    fought: usize,
    captured: usize,
    failed_ticks: u64,
    counts_conserved: bool,
    elapsed_ms: u128,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tidewar=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if args.workers.is_some() {
        config.worker_threads = args.workers;
    }

    let origins = corner_origins(args.width, args.height, args.factions)?;
    let centre = CellCoord::new(args.width as i32 / 2, args.height as i32 / 2);
    let map = build_map(&args, seed, &origins, centre)?;

    let plans: Vec<SpawnPlan> = origins
        .iter()
        .enumerate()
        .map(|(i, origin)| SpawnPlan::cluster(FactionId(i as u8), args.particles, *origin))
        .collect();

    let mut game = Match::new(map, args.factions, &plans, config)?;
    let mut cursors = origins.clone();
    for (i, cell) in cursors.iter().enumerate() {
        game.set_cursor(FactionId(i as u8), *cell, true)?;
    }

    let started = Instant::now();
    let (mut moved, mut fought, mut captured, mut failed_ticks) = (0, 0, 0, 0);

    for tick in 0..args.ticks {
        if tick >= args.hold {
            for (i, cell) in cursors.iter_mut().enumerate() {
                *cell = step_toward(*cell, centre);
                game.set_cursor(FactionId(i as u8), *cell, true)?;
            }
        }

        match game.advance_tick() {
            Ok(report) => {
                moved += report.moved;
                fought += report.fought;
                captured += report.captured;
            }
            Err(e @ TidewarError::TickPartiallyApplied { .. }) => {
                tracing::error!(error = %e, "Continuing after partial tick");
                failed_ticks += 1;
            }
            Err(e) => return Err(e),
        }

        if tick % 100 == 0 {
            tracing::info!(tick, counts = ?game.counts(), "Progress");
        }
    }

    let summary = RunSummary {
        seed,
        width: args.width,
        height: args.height,
        ticks: args.ticks,
        workers: game.workers(),
        total_spawned: game.total_spawned(),
        final_counts: game.counts(),
        moved,
        fought,
        captured,
        failed_ticks,
        counts_conserved: game.audit_counts()?,
        elapsed_ms: started.elapsed().as_millis(),
    };

    if args.format == "text" {
        println!("=== Match finished after {} ticks ===", summary.ticks);
        for (i, count) in summary.final_counts.iter().enumerate() {
            println!("  faction {}: {} particles", i, count);
        }
        println!(
            "  moved {} / fought {} / captured {}",
            summary.moved, summary.fought, summary.captured
        );
        println!(
            "  {} workers, {} ms, conserved: {}",
            summary.workers, summary.elapsed_ms, summary.counts_conserved
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Spawn origins, one per faction, inset from the corners
fn corner_origins(width: usize, height: usize, factions: usize) -> Result<Vec<CellCoord>> {
    if width < 16 || height < 16 {
        return Err(TidewarError::InvalidMap(format!(
            "{}x{} is too small for the runner (minimum 16x16)",
            width, height
        )));
    }
    let (w, h) = (width as i32, height as i32);
    let inset = 4;
    let corners = [
        CellCoord::new(inset, inset),
        CellCoord::new(w - 1 - inset, h - 1 - inset),
        CellCoord::new(w - 1 - inset, inset),
        CellCoord::new(inset, h - 1 - inset),
    ];
    if factions > corners.len() {
        return Err(TidewarError::FactionCount(factions));
    }
    Ok(corners[..factions].to_vec())
}

/// Random obstacles, kept clear around spawn origins and the centre
fn build_map(args: &Args, seed: u64, origins: &[CellCoord], centre: CellCoord) -> Result<ObstacleMap> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let density = args.obstacles.clamp(0.0, 0.9);
    let mut blocked = Vec::with_capacity(args.width * args.height);
    for y in 0..args.height as i32 {
        for x in 0..args.width as i32 {
            let cell = CellCoord::new(x, y);
            let clear = origins
                .iter()
                .chain(std::iter::once(&centre))
                .any(|c| c.chebyshev(&cell) <= 3);
            blocked.push(!clear && rng.gen_bool(density));
        }
    }
    ObstacleMap::new(args.width, args.height, blocked)
}

fn step_toward(from: CellCoord, to: CellCoord) -> CellCoord {
    from.offset((to.x - from.x).signum(), (to.y - from.y).signum())
}
