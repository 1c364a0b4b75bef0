//! Level geometry: tile grid, collision and raycasting

mod collision;
mod raycast;
mod tilemap;

pub use collision::{CollisionOracle, LevelCollision};
pub use raycast::{GridRaycaster, RayHit, RayStop};
pub use tilemap::{LayerId, TileMap, TileQuery};
