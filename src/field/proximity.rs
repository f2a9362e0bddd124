//! Proximity markers: which cells are "near" a faction's cursor
//!
//! Near cells are those reachable from the cursor within a small number of
//! steps without crossing walls. Particles on near cells steer straight at
//! the cursor; everyone else follows the gradient.
//!
//! Each refresh bumps a generation counter and stamps the near cells with
//! it, so stale marks from the previous cursor position expire without a
//! clearing pass. Stamps are signed: a negative generation marks a faction
//! whose cursor is switched off, which no cell stamp can ever match.

use std::collections::VecDeque;

use crate::core::types::CellCoord;
use crate::map::obstacle_map::ObstacleMap;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Near/far stamps for one faction
#[derive(Debug, Clone)]
pub struct ProximityMap {
    stamps: Vec<i64>,
    generation: i64,
    scratch: VecDeque<(usize, u32)>,
}

impl ProximityMap {
    pub fn new(map: &ObstacleMap) -> Self {
        Self {
            stamps: vec![0; map.len()],
            generation: 0,
            scratch: VecDeque::new(),
        }
    }

    /// Re-mark the near region around a cursor
    ///
    /// Returns the number of cells marked near.
    pub fn refresh(&mut self, map: &ObstacleMap, center: CellCoord, radius: u32) -> usize {
        self.generation = self.generation.abs() + 1;
        let generation = self.generation;

        let Some(start) = map.free_index(center) else {
            return 0;
        };

        self.scratch.clear();
        self.stamps[start] = generation;
        self.scratch.push_back((start, 0));
        let mut marked = 1;

        while let Some((index, depth)) = self.scratch.pop_front() {
            if depth == radius {
                continue;
            }
            let cell = map.coord_of(index);
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let Some(next) = map.free_index(cell.offset(dx, dy)) else {
                    continue;
                };
                if self.stamps[next] == generation {
                    continue;
                }
                self.stamps[next] = generation;
                marked += 1;
                self.scratch.push_back((next, depth + 1));
            }
        }

        marked
    }

    /// Mark every cell far (cursor switched off)
    pub fn clear(&mut self) {
        self.generation = -(self.generation.abs() + 1);
    }

    #[inline]
    pub fn is_near(&self, index: usize) -> bool {
        self.generation > 0 && self.stamps[index] == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_map_is_all_far() {
        let map = ObstacleMap::open(5, 5).unwrap();
        let prox = ProximityMap::new(&map);
        assert!((0..25).all(|i| !prox.is_near(i)));
    }

    #[test]
    fn test_refresh_marks_square_radius() {
        let map = ObstacleMap::open(9, 9).unwrap();
        let mut prox = ProximityMap::new(&map);
        let marked = prox.refresh(&map, CellCoord::new(4, 4), 2);
        assert_eq!(marked, 25);
        assert!(prox.is_near(map.index_of(CellCoord::new(2, 6)).unwrap()));
        assert!(!prox.is_near(map.index_of(CellCoord::new(1, 4)).unwrap()));
    }

    #[test]
    fn test_refresh_expires_old_region() {
        let map = ObstacleMap::open(12, 3).unwrap();
        let mut prox = ProximityMap::new(&map);
        prox.refresh(&map, CellCoord::new(1, 1), 1);
        let old = map.index_of(CellCoord::new(0, 1)).unwrap();
        assert!(prox.is_near(old));

        prox.refresh(&map, CellCoord::new(10, 1), 1);
        assert!(!prox.is_near(old));
        assert!(prox.is_near(map.index_of(CellCoord::new(11, 1)).unwrap()));
    }

    #[test]
    fn test_walls_bound_the_near_region() {
        let map = ObstacleMap::from_ascii(&[
            "..#..",
            "..#..",
            "..#..",
        ])
        .unwrap();
        let mut prox = ProximityMap::new(&map);
        prox.refresh(&map, CellCoord::new(1, 1), 4);
        assert!(prox.is_near(map.index_of(CellCoord::new(0, 0)).unwrap()));
        assert!(!prox.is_near(map.index_of(CellCoord::new(3, 1)).unwrap()));
    }

    #[test]
    fn test_clear_makes_everything_far() {
        let map = ObstacleMap::open(3, 3).unwrap();
        let mut prox = ProximityMap::new(&map);
        prox.refresh(&map, CellCoord::new(1, 1), 1);
        prox.clear();
        assert!((0..9).all(|i| !prox.is_near(i)));

        prox.refresh(&map, CellCoord::new(1, 1), 0);
        assert!(prox.is_near(4));
        assert!(!prox.is_near(0));
    }
}
