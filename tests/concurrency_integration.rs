//! Concurrency integration tests
//!
//! Runs identical matches on pools of different sizes and checks that they
//! end in the same state, then checks that a failing worker is reported
//! without losing the rest of the tick.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tidewar::army::SpawnPlan;
use tidewar::core::{CellCoord, FactionId, MatchConfig, TidewarError};
use tidewar::map::ObstacleMap;
use tidewar::simulation::Match;

fn cursor_script(tick: u64) -> [(CellCoord, bool); 2] {
    let sweep = (tick / 10) as i32 % 20;
    [
        (CellCoord::new(8 + sweep, 16), true),
        (CellCoord::new(30 - sweep, 16), tick % 50 < 45),
    ]
}

fn run_scripted(map: ObstacleMap, config: MatchConfig, ticks: u64) -> Match {
    let plans = [
        SpawnPlan::scatter(FactionId(0), 150, 11),
        SpawnPlan::scatter(FactionId(1), 150, 12),
    ];
    let mut game = Match::new(map, 2, &plans, config).unwrap();
    for tick in 0..ticks {
        for (f, (cell, active)) in cursor_script(tick).iter().enumerate() {
            game.set_cursor(FactionId(f as u8), *cell, *active).unwrap();
        }
        game.advance_tick().unwrap();
        assert_eq!(game.counts().iter().sum::<usize>(), 300);
    }
    game
}

#[test]
fn test_single_chunk_identical_across_pool_sizes() {
    let run = |workers: usize| {
        let config = MatchConfig {
            worker_threads: Some(workers),
            chunk_count: 1,
            attack_damage: 300,
            ..Default::default()
        };
        let game = run_scripted(ObstacleMap::open(40, 32).unwrap(), config, 150);
        (game.counts(), game.particles().unwrap())
    };

    let (counts1, particles1) = run(1);
    let (counts4, particles4) = run(4);
    assert_eq!(counts1, counts4);
    assert_eq!(particles1, particles4);
}

#[test]
fn test_separated_armies_agree_across_pool_sizes() {
    // A wall down the middle keeps the armies apart; each side is scattered
    // over its own half.
    let mut rows = Vec::new();
    for _ in 0..32 {
        rows.push(format!("{}#{}", ".".repeat(19), ".".repeat(20)));
    }
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

    let run = |workers: usize| {
        let map = ObstacleMap::from_ascii(&rows).unwrap();
        let config = MatchConfig {
            worker_threads: Some(workers),
            chunk_count: 8,
            ..Default::default()
        };
        let plans = [
            SpawnPlan::cluster(FactionId(0), 200, CellCoord::new(5, 16)),
            SpawnPlan::cluster(FactionId(1), 200, CellCoord::new(34, 16)),
        ];
        let mut game = Match::new(map, 2, &plans, config).unwrap();
        game.set_cursor(FactionId(0), CellCoord::new(18, 2), true).unwrap();
        game.set_cursor(FactionId(1), CellCoord::new(21, 29), true).unwrap();
        for _ in 0..100 {
            game.advance_tick().unwrap();
        }
        assert!(game.audit_counts().unwrap());
        game.counts()
    };

    assert_eq!(run(1), run(4));
}

#[test]
fn test_contested_run_identical_across_pool_sizes() {
    // Two scattered armies fighting over the middle of an open map, with
    // every chunk in contact with the others.
    let run = |workers: usize, chunk_count: usize| {
        let config = MatchConfig {
            worker_threads: Some(workers),
            chunk_count,
            ..Default::default()
        };
        let plans = [
            SpawnPlan::scatter(FactionId(0), 400, 21),
            SpawnPlan::scatter(FactionId(1), 400, 22),
        ];
        let mut game = Match::new(ObstacleMap::open(40, 32).unwrap(), 2, &plans, config).unwrap();
        game.set_cursor(FactionId(0), CellCoord::new(20, 16), true).unwrap();
        game.set_cursor(FactionId(1), CellCoord::new(21, 16), true).unwrap();
        let mut captured = 0;
        for _ in 0..300 {
            captured += game.advance_tick().unwrap().captured;
        }
        assert!(captured > 0, "the armies never fought");
        assert!(game.audit_counts().unwrap());
        (game.counts(), game.particles().unwrap())
    };

    let (counts1, particles1) = run(1, 16);
    for _ in 0..3 {
        let (counts8, particles8) = run(8, 16);
        assert_eq!(counts1, counts8);
        assert_eq!(particles1, particles8);
    }
    let (counts_one_chunk, particles_one_chunk) = run(4, 1);
    assert_eq!(counts1, counts_one_chunk);
    assert_eq!(particles1, particles_one_chunk);
}

#[test]
fn test_contested_many_chunks_conserves_counts() {
    let config = MatchConfig {
        worker_threads: Some(4),
        chunk_count: 16,
        attack_damage: 300,
        ..Default::default()
    };
    let game = run_scripted(ObstacleMap::open(40, 32).unwrap(), config, 300);
    assert!(game.audit_counts().unwrap());
    for p in game.particles().unwrap() {
        assert!((0..game.config().max_health).contains(&p.health));
    }
}

#[test]
fn test_worker_failure_reports_partial_tick() {
    let config = MatchConfig {
        worker_threads: Some(2),
        chunk_count: 4,
        regen_interval: 0,
        ..Default::default()
    };
    let map = ObstacleMap::open(24, 24).unwrap();
    let plans = [
        SpawnPlan::cluster(FactionId(0), 20, CellCoord::new(2, 2)),
        SpawnPlan::cluster(FactionId(1), 20, CellCoord::new(20, 20)),
    ];
    let mut game = Match::new(map, 2, &plans, config).unwrap();
    game.set_cursor(FactionId(0), CellCoord::new(0, 23), true).unwrap();
    game.set_cursor(FactionId(1), CellCoord::new(23, 0), true).unwrap();
    let before = game.particles().unwrap();

    // Poison particle 0 so the first chunk fails as soon as it starts.
    let vitals = &game.particle_pool().vitals()[0];
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let _guard = vitals.lock().unwrap();
        panic!("poisoning particle 0");
    }));

    match game.advance_tick() {
        Err(TidewarError::TickPartiallyApplied { tick, failures }) => {
            assert_eq!(tick, 0);
            assert!(!failures.is_empty());
            assert!(failures
                .iter()
                .all(|e| matches!(e, TidewarError::LockPoisoned(_))));
        }
        other => panic!("expected a partial tick, got {other:?}"),
    }
    assert_eq!(game.tick(), 1);

    // The far army's chunks ran to completion and stay applied.
    let after: Vec<CellCoord> = game.particle_pool().positions().to_vec();
    let far_moved = (20..40).filter(|&i| after[i] != before[i].position).count();
    assert!(far_moved > 0);
    assert_eq!(game.counts().iter().sum::<usize>(), 40);
}
