//! Simulation core for a tile-based first-person game
//!
//! This crate provides:
//! - Enemy behavior state machine with patrol loops
//! - Throttled line-of-sight perception over a DDA grid raycaster
//! - Sliding doors with open/close animation and blocking queries
//! - Circle-vs-tile collision for enemy movement

pub mod ai;
pub mod core;
pub mod door;
pub mod world;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{Enemy, EnemyPlacement, EnemyState, EnemySystem, Player, SpriteFacing};
    pub use crate::core::{EventQueue, SimEvent, Simulation, SimulationConfig, SimulationStats};
    pub use crate::door::{Door, DoorId, DoorRegistry, DoorState};
    pub use crate::world::{CollisionOracle, GridRaycaster, LayerId, TileMap, TileQuery};
    pub use glam::{Vec2, Vec3};
}
