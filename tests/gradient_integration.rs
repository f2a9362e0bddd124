//! Gradient field integration tests
//!
//! Wave propagation through the public `Match` API: one full rotation of
//! sweeps from a single cursor, and walls bounding the waves.

use tidewar::army::SpawnPlan;
use tidewar::core::{CellCoord, FactionId, MatchConfig};
use tidewar::field::UNREACHED;
use tidewar::map::ObstacleMap;
use tidewar::simulation::Match;

fn lone_cursor_match(map: ObstacleMap, cursor: CellCoord) -> Match {
    let (w, h) = (map.width() as i32, map.height() as i32);
    let plans = [
        SpawnPlan::cluster(FactionId(0), 1, CellCoord::new(0, 0)),
        SpawnPlan::cluster(FactionId(1), 1, CellCoord::new(w - 1, h - 1)),
    ];
    let mut game = Match::new(map, 2, &plans, MatchConfig::default()).unwrap();
    game.set_cursor(FactionId(0), cursor, true).unwrap();
    game
}

#[test]
fn test_field_monotone_after_full_rotation() {
    let cursor = CellCoord::new(8, 8);
    let mut game = lone_cursor_match(ObstacleMap::open(16, 16).unwrap(), cursor);
    for _ in 0..12 {
        game.advance_tick().unwrap();
    }

    let field = game.gradient(FactionId(0)).unwrap();
    let mut cells = Vec::new();
    for y in 0..16 {
        for x in 0..16 {
            let cell = CellCoord::new(x, y);
            let value = field.value_at(cell).unwrap();
            assert_ne!(value, UNREACHED, "cell {} never reached", cell);
            cells.push((cell.chebyshev(&cursor), value));
        }
    }

    for &(near_distance, near_value) in &cells {
        for &(far_distance, far_value) in &cells {
            if near_distance < far_distance {
                assert!(
                    near_value <= far_value,
                    "distance {} holds {} but distance {} holds {}",
                    near_distance,
                    near_value,
                    far_distance,
                    far_value
                );
            }
        }
    }
}

#[test]
fn test_waves_expand_over_ticks() {
    let mut game = lone_cursor_match(ObstacleMap::open(16, 16).unwrap(), CellCoord::new(3, 12));
    game.advance_tick().unwrap();
    let after_one = game.gradient(FactionId(0)).unwrap().reached_cells();
    for _ in 1..12 {
        game.advance_tick().unwrap();
    }
    let after_rotation = game.gradient(FactionId(0)).unwrap().reached_cells();
    assert!(after_one < after_rotation);
    assert_eq!(after_rotation, 256);
}

#[test]
fn test_walls_stop_the_wave() {
    let map = ObstacleMap::from_ascii(&[
        "....#....",
        "....#....",
        "....#....",
        "....#....",
        "....#....",
    ])
    .unwrap();
    let mut game = lone_cursor_match(map, CellCoord::new(1, 2));
    for _ in 0..36 {
        game.advance_tick().unwrap();
    }

    let field = game.gradient(FactionId(0)).unwrap();
    for y in 0..5 {
        assert_ne!(field.value_at(CellCoord::new(0, y)), Some(UNREACHED));
        assert_eq!(field.value_at(CellCoord::new(4, y)), Some(UNREACHED));
        assert_eq!(field.value_at(CellCoord::new(7, y)), Some(UNREACHED));
    }
}

#[test]
fn test_cursor_cell_is_overwritten_not_minimized() {
    let config = MatchConfig {
        cursor_max_freshness: 1000,
        ..Default::default()
    };
    let map = ObstacleMap::open(8, 8).unwrap();
    let plans = [
        SpawnPlan::cluster(FactionId(0), 1, CellCoord::new(0, 7)),
        SpawnPlan::cluster(FactionId(1), 1, CellCoord::new(7, 7)),
    ];
    let mut game = Match::new(map, 2, &plans, config).unwrap();
    game.set_cursor(FactionId(0), CellCoord::new(1, 1), true).unwrap();
    for _ in 0..100 {
        game.advance_tick().unwrap();
    }

    // Move next door: the fresh source overwrites the lower value
    // propagation had already given that cell, so the cell goes up.
    let next = CellCoord::new(2, 1);
    let before = game.gradient(FactionId(0)).unwrap().value_at(next).unwrap();
    assert!(before < 1000);
    game.set_cursor(FactionId(0), next, true).unwrap();
    game.advance_tick().unwrap();
    let after = game.gradient(FactionId(0)).unwrap().value_at(next).unwrap();
    assert!(after > before, "{} should exceed {}", after, before);
}
