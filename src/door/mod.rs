//! Sliding doors
//!
//! Doors are created once per level from a tile layer and animate every tick.

mod door;
mod registry;

pub use door::{Door, DoorAxis, DoorId, DoorState};
pub use registry::{DoorCommand, DoorRegistry};
