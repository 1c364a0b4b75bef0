//! Enemy AI module
//!
//! Provides the behavior state machine, patrol loops, perception and the
//! system that drives them each tick.

mod enemy;
mod fsm;
mod patrol;
mod perception;
mod system;

pub use enemy::{Enemy, EnemyPlacement, SpriteFacing};
pub use fsm::{BehaviorMachine, EnemyState, Transition};
pub use patrol::{PatrolRoute, PatrolStep, Waypoints};
pub use perception::{PerceptionClock, Sight, perceive, world_to_grid};
pub use system::{AiContext, EnemySystem, Player, rotate_to_face};
