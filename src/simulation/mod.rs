//! Simulation - the match state object, tick loop and worker coordination

pub mod coordinator;
pub mod fork_join;
pub mod snapshot;
pub mod tick;

pub use coordinator::{ChunkOutcome, Coordinator};
pub use fork_join::{split_reduce, ForkJoin, RayonJoin, Sequential};
pub use snapshot::{CursorState, MatchSnapshot};
pub use tick::{Match, TickReport};
