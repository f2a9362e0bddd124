//! Initial army placement
//!
//! Armies are placed once at match start. A cluster grows breadth-first
//! from an origin cell; a scatter picks random free cells from a seeded
//! generator. No two particles ever share a cell.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::army::particle::ParticlePool;
use crate::core::error::{Result, TidewarError};
use crate::core::types::{CellCoord, FactionId, MAX_PARTICLES};
use crate::map::direction::Direction;
use crate::map::obstacle_map::ObstacleMap;

/// How an army is laid out on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnLayout {
    /// Breadth-first blob grown from `origin`
    Cluster { origin: CellCoord },
    /// Uniformly random free cells
    Scatter { seed: u64 },
}

/// Army to place at match start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub faction: FactionId,
    pub count: usize,
    pub layout: SpawnLayout,
}

impl SpawnPlan {
    pub fn cluster(faction: FactionId, count: usize, origin: CellCoord) -> Self {
        Self {
            faction,
            count,
            layout: SpawnLayout::Cluster { origin },
        }
    }

    pub fn scatter(faction: FactionId, count: usize, seed: u64) -> Self {
        Self {
            faction,
            count,
            layout: SpawnLayout::Scatter { seed },
        }
    }
}

/// Place every planned army, in plan order
///
/// Particles start at `health`. Fails if the plans ask for more than
/// `MAX_PARTICLES` in total, or if a plan cannot find enough free cells
/// reachable from its origin.
pub fn spawn_armies(map: &ObstacleMap, plans: &[SpawnPlan], health: i32) -> Result<ParticlePool> {
    let total = plans
        .iter()
        .try_fold(0usize, |sum, p| sum.checked_add(p.count))
        .filter(|&total| total <= MAX_PARTICLES)
        .ok_or_else(|| {
            TidewarError::InvalidConfig(format!(
                "spawn plans exceed the {} particle limit",
                MAX_PARTICLES
            ))
        })?;
    let mut pool = ParticlePool::with_capacity(total);
    let mut taken = vec![false; map.len()];

    for plan in plans {
        let cells = match plan.layout {
            SpawnLayout::Cluster { origin } => cluster_cells(map, &taken, origin, plan.count)?,
            SpawnLayout::Scatter { seed } => scatter_cells(map, &taken, seed, plan.count),
        };

        if cells.len() < plan.count {
            return Err(TidewarError::SpawnCapacity {
                faction: plan.faction,
                requested: plan.count,
                placed: cells.len(),
            });
        }

        for index in cells {
            taken[index] = true;
            pool.push(map.coord_of(index), plan.faction, health);
        }

        tracing::debug!(
            faction = plan.faction.index(),
            count = plan.count,
            "army placed"
        );
    }

    Ok(pool)
}

/// Free cells in breadth-first order from `origin`
///
/// The search walks through cells already taken by earlier armies but
/// never places on them.
fn cluster_cells(map: &ObstacleMap, taken: &[bool], origin: CellCoord, count: usize) -> Result<Vec<usize>> {
    let start = map
        .free_index(origin)
        .ok_or(TidewarError::OutOfBounds(origin))?;

    let mut cells = Vec::with_capacity(count);
    let mut visited = vec![false; map.len()];
    let mut queue = VecDeque::new();
    visited[start] = true;
    queue.push_back(start);

    while let Some(index) = queue.pop_front() {
        if cells.len() == count {
            break;
        }
        if !taken[index] {
            cells.push(index);
        }
        let cell = map.coord_of(index);
        for dir in Direction::ALL {
            if let Some(next) = map.free_index(dir.step(cell)) {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    Ok(cells)
}

/// Up to `count` random free, untaken cells
fn scatter_cells(map: &ObstacleMap, taken: &[bool], seed: u64, count: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut candidates: Vec<usize> = (0..map.len())
        .filter(|&i| !map.is_blocked_index(i) && !taken[i])
        .collect();
    candidates.shuffle(&mut rng);
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cluster_grows_around_origin() {
        let map = ObstacleMap::open(10, 10).unwrap();
        let plans = [SpawnPlan::cluster(FactionId(0), 9, CellCoord::new(5, 5))];
        let pool = spawn_armies(&map, &plans, 100).unwrap();
        assert_eq!(pool.len(), 9);
        for pos in pool.positions() {
            assert!(pos.chebyshev(&CellCoord::new(5, 5)) <= 1);
        }
    }

    #[test]
    fn test_armies_never_share_cells() {
        let map = ObstacleMap::open(8, 8).unwrap();
        let plans = [
            SpawnPlan::cluster(FactionId(0), 20, CellCoord::new(3, 3)),
            SpawnPlan::cluster(FactionId(1), 20, CellCoord::new(4, 4)),
            SpawnPlan::scatter(FactionId(2), 20, 7),
        ];
        let pool = spawn_armies(&map, &plans, 100).unwrap();
        let unique: HashSet<_> = pool.positions().iter().collect();
        assert_eq!(unique.len(), 60);
    }

    #[test]
    fn test_cluster_respects_walls() {
        let map = ObstacleMap::from_ascii(&["..#....", "..#....", "..#...."]).unwrap();
        let plans = [SpawnPlan::cluster(FactionId(0), 7, CellCoord::new(0, 0))];
        let err = spawn_armies(&map, &plans, 10).unwrap_err();
        assert!(matches!(
            err,
            TidewarError::SpawnCapacity {
                requested: 7,
                placed: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_origin_on_wall_rejected() {
        let map = ObstacleMap::from_ascii(&["#.."]).unwrap();
        let plans = [SpawnPlan::cluster(FactionId(0), 1, CellCoord::new(0, 0))];
        assert!(matches!(
            spawn_armies(&map, &plans, 10),
            Err(TidewarError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_oversized_pool_rejected() {
        let map = ObstacleMap::open(4, 4).unwrap();
        let plans = [
            SpawnPlan::cluster(FactionId(0), MAX_PARTICLES, CellCoord::new(0, 0)),
            SpawnPlan::cluster(FactionId(1), 1, CellCoord::new(3, 3)),
        ];
        assert!(matches!(
            spawn_armies(&map, &plans, 10),
            Err(TidewarError::InvalidConfig(_))
        ));

        let plans = [
            SpawnPlan::cluster(FactionId(0), usize::MAX, CellCoord::new(0, 0)),
            SpawnPlan::cluster(FactionId(1), 2, CellCoord::new(3, 3)),
        ];
        assert!(matches!(
            spawn_armies(&map, &plans, 10),
            Err(TidewarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scatter_is_seeded() {
        let map = ObstacleMap::open(16, 16).unwrap();
        let plans = [SpawnPlan::scatter(FactionId(1), 30, 42)];
        let a = spawn_armies(&map, &plans, 10).unwrap();
        let b = spawn_armies(&map, &plans, 10).unwrap();
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn test_spawn_health_applied() {
        let map = ObstacleMap::open(4, 4).unwrap();
        let plans = [SpawnPlan::cluster(FactionId(0), 3, CellCoord::new(0, 0))];
        let pool = spawn_armies(&map, &plans, 77).unwrap();
        for p in pool.snapshot().unwrap() {
            assert_eq!(p.health, 77);
            assert_eq!(p.faction, FactionId(0));
        }
    }
}
