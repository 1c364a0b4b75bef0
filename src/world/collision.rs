//! Collision queries for moving agents

use glam::{Vec2, Vec3};

use crate::door::DoorRegistry;
use crate::world::{LayerId, TileQuery};

/// Answers whether a circle at a position overlaps level geometry.
///
/// Implemented by whatever owns the level's collision data; the AI only asks
/// before committing a move.
pub trait CollisionOracle {
    /// Check if a circle of `radius` (world units) centered at `position`
    /// overlaps solid geometry. Height is ignored.
    fn check_collision_at_position(&self, position: Vec3, radius: f32) -> bool;
}

/// Circle-vs-tile collision against walls and map edges, plus door panels.
///
/// Tile `(i, j)` covers the world square centered on `(i, j) * quad_size`.
/// A door that is not fully open is a one-tile panel across its own tile
/// (see [`DoorRegistry::overlaps_door`]); it does not extend along its line.
#[derive(Debug, Clone, Copy)]
pub struct LevelCollision<'a, M: TileQuery> {
    map: &'a M,
    doors: &'a DoorRegistry,
    wall_layer: LayerId,
    quad_size: f32,
}

impl<'a, M: TileQuery> LevelCollision<'a, M> {
    /// Create a collision view over a level
    pub fn new(map: &'a M, doors: &'a DoorRegistry, wall_layer: LayerId, quad_size: f32) -> Self {
        Self {
            map,
            doors,
            wall_layer,
            quad_size,
        }
    }

    fn is_solid(&self, x: i32, y: i32) -> bool {
        !self.map.in_bounds(x, y) || self.map.tile(self.wall_layer, x, y) > 0
    }
}

impl<M: TileQuery> CollisionOracle for LevelCollision<'_, M> {
    fn check_collision_at_position(&self, position: Vec3, radius: f32) -> bool {
        if !position.is_finite() || self.quad_size <= 0.0 {
            return true;
        }

        let world = Vec2::new(position.x, position.z);
        if self.doors.overlaps_door(world, radius, self.quad_size) {
            return true;
        }

        // Door space: tile centers sit on integer coordinates
        let center = world / self.quad_size;
        let r = radius.max(0.0) / self.quad_size;

        let min_x = (center.x - r + 0.5).floor() as i32;
        let max_x = (center.x + r + 0.5).floor() as i32;
        let min_y = (center.y - r + 0.5).floor() as i32;
        let max_y = (center.y + r + 0.5).floor() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if !self.is_solid(x, y) {
                    continue;
                }
                let lo = Vec2::new(x as f32 - 0.5, y as f32 - 0.5);
                let hi = lo + Vec2::ONE;
                let closest = center.clamp(lo, hi);
                if closest.distance_squared(center) < r * r {
                    return true;
                }
            }
        }

        false
    }
}
