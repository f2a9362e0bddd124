//! Guidance fields - per-faction gradients, cursors and their propagation

pub mod cursor;
pub mod gradient;
pub mod propagation;
pub mod proximity;

pub use cursor::{inject_cursor, Cursor, CursorUpdate};
pub use gradient::{GradientField, UNREACHED};
pub use propagation::{propagate, propagate_all, sweep_direction, SWEEP_STRIDE};
pub use proximity::ProximityMap;
