//! Static obstacle grid
//!
//! Decoded by an external map loader; the simulation only ever reads it.

use crate::core::error::{Result, TidewarError};
use crate::core::types::CellCoord;

/// Immutable grid of traversable / blocking cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMap {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl ObstacleMap {
    /// Build from row-major obstacle flags (`true` = blocking)
    pub fn new(width: usize, height: usize, blocked: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TidewarError::InvalidMap(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(TidewarError::InvalidMap(format!(
                "dimensions {}x{} exceed coordinate range",
                width, height
            )));
        }
        if blocked.len() != width * height {
            return Err(TidewarError::InvalidMap(format!(
                "expected {} obstacle flags for {}x{}, got {}",
                width * height,
                width,
                height,
                blocked.len()
            )));
        }
        Ok(Self {
            width,
            height,
            blocked,
        })
    }

    /// Map with no obstacles at all
    pub fn open(width: usize, height: usize) -> Result<Self> {
        Self::new(width, height, vec![false; width * height])
    }

    /// Parse ASCII rows: `#` blocks, any other character is free
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut blocked = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(TidewarError::InvalidMap(format!(
                    "row {} has {} cells, expected {}",
                    y, len, width
                )));
            }
            blocked.extend(row.chars().map(|c| c == '#'));
        }
        Self::new(width, height, blocked)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    /// Row-major index, `None` when off the map
    #[inline]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.y as usize * self.width + cell.x as usize)
        } else {
            None
        }
    }

    /// Coordinate of a row-major index
    #[inline]
    pub fn coord_of(&self, index: usize) -> CellCoord {
        CellCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    #[inline]
    pub fn is_blocked_index(&self, index: usize) -> bool {
        self.blocked[index]
    }

    /// Off-map cells count as blocked
    #[inline]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.index_of(cell).map(|i| self.blocked[i]).unwrap_or(true)
    }

    /// Index of a traversable cell, `None` for walls and off-map cells
    #[inline]
    pub fn free_index(&self, cell: CellCoord) -> Option<usize> {
        self.index_of(cell).filter(|&i| !self.blocked[i])
    }

    /// Number of traversable cells
    pub fn free_cells(&self) -> usize {
        self.blocked.iter().filter(|b| !**b).count()
    }
}
