//! Static map - the obstacle grid and the movement directions over it

pub mod direction;
pub mod obstacle_map;

pub use direction::{
    compass_code, compass_direction, Direction, ALTERNATE_TRIES, DIRECTION_COUNT,
};
pub use obstacle_map::ObstacleMap;
