//! The twelve movement directions and their lookup tables
//!
//! Twelve directions map onto the eight grid neighbors: the four cardinal
//! neighbors each get two directions that "lean" toward one side (ENE/ESE,
//! SSE/SSW, ...), the diagonals get one each. The lean decides which side
//! a blocked particle tries first, which keeps flows from looking
//! grid-aligned.
//!
//! Directions are numbered clockwise with y growing downward. Directions
//! 0..=5 point at neighbors with a higher row-major index, 6..=11 at lower
//! ones; the propagator relies on that split to pick its scan order.

use serde::{Deserialize, Serialize};

use crate::core::types::CellCoord;

/// Number of discrete directions
pub const DIRECTION_COUNT: usize = 12;

/// Number of fallback directions tried after the primary one
pub const ALTERNATE_TRIES: usize = 4;

/// One of the twelve movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    EastNorthEast = 0,
    EastSouthEast = 1,
    SouthEast = 2,
    SouthSouthEast = 3,
    SouthSouthWest = 4,
    SouthWest = 5,
    WestSouthWest = 6,
    WestNorthWest = 7,
    NorthWest = 8,
    NorthNorthWest = 9,
    NorthNorthEast = 10,
    NorthEast = 11,
}

// Eight-neighbor ring, clockwise from east.
const RING_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const RING_OF: [usize; DIRECTION_COUNT] = [0, 0, 1, 2, 2, 3, 4, 4, 5, 6, 6, 7];

// +1 leans clockwise along the ring, -1 counter-clockwise.
const LEAN_OF: [i32; DIRECTION_COUNT] = [-1, 1, 1, -1, 1, 1, -1, 1, 1, -1, 1, 1];

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::EastNorthEast,
        Direction::EastSouthEast,
        Direction::SouthEast,
        Direction::SouthSouthEast,
        Direction::SouthSouthWest,
        Direction::SouthWest,
        Direction::WestSouthWest,
        Direction::WestNorthWest,
        Direction::NorthWest,
        Direction::NorthNorthWest,
        Direction::NorthNorthEast,
        Direction::NorthEast,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for any integer, wrapping modulo 12
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % DIRECTION_COUNT]
    }

    /// Unit grid offset `(dx, dy)`
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        RING_OFFSETS[RING_OF[self.index()]]
    }

    /// Neighbor of `cell` in this direction (may be off the map)
    #[inline]
    pub fn step(self, cell: CellCoord) -> CellCoord {
        let (dx, dy) = self.offset();
        cell.offset(dx, dy)
    }

    /// Whether the neighbor in this direction has a higher row-major index
    #[inline]
    pub fn points_forward(self) -> bool {
        self.index() < DIRECTION_COUNT / 2
    }

    /// The alternates tried, in order, when this direction is unavailable
    #[inline]
    pub fn alternates(self, parity: usize) -> &'static [Direction; ALTERNATE_TRIES] {
        &ALTERNATES[parity & 1][self.index()]
    }
}

const fn direction_on_ring(ring: usize, lean: i32) -> Direction {
    match ring {
        0 => {
            if lean < 0 {
                Direction::EastNorthEast
            } else {
                Direction::EastSouthEast
            }
        }
        1 => Direction::SouthEast,
        2 => {
            if lean < 0 {
                Direction::SouthSouthEast
            } else {
                Direction::SouthSouthWest
            }
        }
        3 => Direction::SouthWest,
        4 => {
            if lean < 0 {
                Direction::WestSouthWest
            } else {
                Direction::WestNorthWest
            }
        }
        5 => Direction::NorthWest,
        6 => {
            if lean < 0 {
                Direction::NorthNorthWest
            } else {
                Direction::NorthNorthEast
            }
        }
        _ => Direction::NorthEast,
    }
}

/// `[parity][direction][try]`: lean side first, then the other side, then
/// two steps out on each side. Odd parity flips the lean.
const fn build_alternates() -> [[[Direction; ALTERNATE_TRIES]; DIRECTION_COUNT]; 2] {
    let mut table = [[[Direction::EastNorthEast; ALTERNATE_TRIES]; DIRECTION_COUNT]; 2];
    let mut parity = 0;
    while parity < 2 {
        let mut dir = 0;
        while dir < DIRECTION_COUNT {
            let ring = RING_OF[dir] as i32;
            let lean = if parity == 0 { LEAN_OF[dir] } else { -LEAN_OF[dir] };
            let steps = [lean, -lean, 2 * lean, -2 * lean];
            let mut k = 0;
            while k < ALTERNATE_TRIES {
                let target = (ring + steps[k]).rem_euclid(8) as usize;
                table[parity][dir][k] = direction_on_ring(target, steps[k]);
                k += 1;
            }
            dir += 1;
        }
        parity += 1;
    }
    table
}

static ALTERNATES: [[[Direction; ALTERNATE_TRIES]; DIRECTION_COUNT]; 2] = build_alternates();

// Compass bits, set from the sign of (target - origin) on each axis.
pub const COMPASS_NORTH: u8 = 1;
pub const COMPASS_EAST: u8 = 2;
pub const COMPASS_SOUTH: u8 = 4;
pub const COMPASS_WEST: u8 = 8;

/// 4-bit compass code pointing from `from` toward `to`
#[inline]
pub fn compass_code(from: CellCoord, to: CellCoord) -> u8 {
    let mut code = 0;
    if to.y < from.y {
        code |= COMPASS_NORTH;
    }
    if to.x > from.x {
        code |= COMPASS_EAST;
    }
    if to.y > from.y {
        code |= COMPASS_SOUTH;
    }
    if to.x < from.x {
        code |= COMPASS_WEST;
    }
    code
}

use Direction as D;

/// `[parity][code]` -> direction; `None` for "already there" and
/// impossible codes (north and south together)
static COMPASS: [[Option<Direction>; 16]; 2] = [
    [
        None,                       // 0
        Some(D::NorthNorthEast),    // N
        Some(D::EastNorthEast),     // E
        Some(D::NorthEast),         // NE
        Some(D::SouthSouthWest),    // S
        None,                       // N S
        Some(D::SouthEast),         // SE
        None,                       // N E S
        Some(D::WestNorthWest),     // W
        Some(D::NorthWest),         // NW
        None,                       // E W
        None,                       // N E W
        Some(D::SouthWest),         // SW
        None,                       // N S W
        None,                       // E S W
        None,                       // all
    ],
    [
        None,
        Some(D::NorthNorthWest),
        Some(D::EastSouthEast),
        Some(D::NorthEast),
        Some(D::SouthSouthEast),
        None,
        Some(D::SouthEast),
        None,
        Some(D::WestSouthWest),
        Some(D::NorthWest),
        None,
        None,
        Some(D::SouthWest),
        None,
        None,
        None,
    ],
];

/// Direction for a compass code under the given parity
#[inline]
pub fn compass_direction(code: u8, parity: usize) -> Option<Direction> {
    COMPASS[parity & 1][(code & 0x0f) as usize]
}
