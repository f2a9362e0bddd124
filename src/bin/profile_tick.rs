use std::time::{Duration, Instant};

use tidewar::army::{spawn_armies, FactionCounts, SpawnPlan};
use tidewar::battle::{is_regen_tick, regenerate, ClaimBoard, Intent, Occupancy, ResolveContext};
use tidewar::core::{CellCoord, FactionId, MatchConfig};
use tidewar::field::{propagate_all, Cursor, GradientField, ProximityMap};
use tidewar::map::ObstacleMap;
use tidewar::simulation::{ChunkOutcome, Coordinator};

fn main() -> tidewar::Result<()> {
    let per_faction = 10_000;
    let (width, height) = (256usize, 192usize);
    println!(
        "Profiling tick phases with 2 x {} particles on {}x{}\n",
        per_faction, width, height
    );

    let config = MatchConfig::default();
    let map = ObstacleMap::open(width, height)?;
    let plans = [
        SpawnPlan::cluster(FactionId(0), per_faction, CellCoord::new(40, 40)),
        SpawnPlan::cluster(FactionId(1), per_faction, CellCoord::new(215, 151)),
    ];
    let mut pool = spawn_armies(&map, &plans, config.max_health - 1)?;
    let occupancy = Occupancy::from_positions(&map, pool.positions())?;
    let claims = ClaimBoard::new(map.len());
    let mut intents = vec![Intent::Idle; pool.len()];
    let counts = FactionCounts::new(2);
    counts.add(FactionId(0), per_faction);
    counts.add(FactionId(1), per_faction);
    let coordinator = Coordinator::new(config.worker_threads, config.chunk_count)?;

    let mut fields = vec![GradientField::new(&map), GradientField::new(&map)];
    let mut proximity = vec![ProximityMap::new(&map), ProximityMap::new(&map)];
    let mut cursors = vec![Cursor::default(); 2];
    let centre = CellCoord::new(width as i32 / 2, height as i32 / 2);
    for (i, cursor) in cursors.iter_mut().enumerate() {
        cursor.update(centre, true, config.cursor_max_freshness);
        proximity[i].refresh(&map, centre, config.proximity_radius);
    }

    let mut times = TickTimes::default();
    for tick in 0..200u64 {
        let tick_start = Instant::now();

        // Phase 1: Inject + decay
        let start = Instant::now();
        for (cursor, field) in cursors.iter_mut().zip(fields.iter_mut()) {
            cursor.inject(field, &map);
            cursor.decay();
        }
        times.inject += start.elapsed();

        // Phase 2: Propagation
        let start = Instant::now();
        coordinator.install(|| propagate_all(&mut fields, &map, tick, config.cell_cost));
        times.propagate += start.elapsed();

        // Phase 3: Movement + combat
        let start = Instant::now();
        let (positions, vitals) = pool.split_mut();
        let ctx = ResolveContext {
            map: &map,
            fields: &fields,
            proximity: &proximity,
            cursors: &cursors,
            occupancy: &occupancy,
            claims: &claims,
            vitals,
            counts: &counts,
            tick,
            attack_damage: config.attack_damage,
            max_health: config.max_health,
        };
        let outcome = coordinator.resolve(&ctx, positions, &mut intents);
        times.resolve += start.elapsed();
        times.record(&outcome);

        // Phase 4: Regeneration
        let start = Instant::now();
        if is_regen_tick(tick, config.regen_interval) {
            regenerate(pool.vitals(), config.regen_amount, config.max_health)?;
        }
        times.regen += start.elapsed();

        times.total += tick_start.elapsed();
        times.samples += 1;
    }

    let n = times.samples.max(1);
    println!("=== Average times per tick ({} samples, {} workers) ===\n", n, coordinator.workers());
    println!("Phase           | Time       | % of total");
    println!("----------------|------------|------------");
    println!("Inject + decay  | {:>8.2?} | {:>5.1}%", times.inject / n, pct(times.inject, times.total));
    println!("Propagation     | {:>8.2?} | {:>5.1}%", times.propagate / n, pct(times.propagate, times.total));
    println!("Resolve         | {:>8.2?} | {:>5.1}%", times.resolve / n, pct(times.resolve, times.total));
    println!("Regeneration    | {:>8.2?} | {:>5.1}%", times.regen / n, pct(times.regen, times.total));
    println!("----------------|------------|------------");
    println!("TOTAL           | {:>8.2?} | 100.0%", times.total / n);
    println!("\nCaptures: {}, final counts: {:?}", times.captured, counts.snapshot());
    if times.failures > 0 {
        println!(
            "WARNING: {} worker failure(s), timings cover partial ticks",
            times.failures
        );
    }
    println!("Target: <16.6ms for 60 ticks/sec");
    Ok(())
}

fn pct(part: Duration, total: Duration) -> f64 {
    (part.as_nanos() as f64 / total.as_nanos().max(1) as f64) * 100.0
}

#[derive(Default)]
struct TickTimes {
    inject: Duration,
    propagate: Duration,
    resolve: Duration,
    regen: Duration,
    total: Duration,
    samples: u32,
    captured: usize,
    failures: usize,
}

impl TickTimes {
    fn record(&mut self, outcome: &ChunkOutcome) {
        self.captured += outcome.stats.captured;
        self.failures += outcome.failures.len();
    }
}
