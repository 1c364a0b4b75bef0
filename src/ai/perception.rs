//! Enemy perception
//!
//! Visibility is recomputed at a fixed cadence, not every tick: enemies keep
//! their last verdict between passes. Each check runs the cheap tests first
//! (range, then cone) and only raycasts when both pass.

use glam::{Vec2, Vec3};

use super::enemy::Enemy;
use crate::core::PerceptionConfig;
use crate::core::math::normalize_angle;
use crate::world::{GridRaycaster, TileQuery};

/// Accumulates tick time and reports when a perception pass is due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionClock {
    accumulator: f32,
    interval: f32,
}

impl PerceptionClock {
    /// Create a clock firing every `interval` seconds
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            accumulator: 0.0,
            interval,
        }
    }

    /// Seconds between passes
    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Add tick time; returns true when a pass is due.
    ///
    /// At most one pass runs per tick; leftover time carries over.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.accumulator += dt;
        if self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            true
        } else {
            false
        }
    }

    /// Forget accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Outcome of one visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sight {
    /// Farther than the sight range
    OutOfRange,
    /// Outside the vision cone
    OutsideCone,
    /// In the cone, but a wall or closed door is in the way
    Occluded,
    /// Clear line of sight
    Visible,
}

impl Sight {
    /// Whether the player is seen
    #[must_use]
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// World position to grid space (tile centers at `i + 0.5`)
#[inline]
#[must_use]
pub fn world_to_grid(position: Vec3, quad_size: f32) -> Vec2 {
    Vec2::new(position.x, position.z) / quad_size + Vec2::splat(0.5)
}

/// Run one perception check for an enemy.
///
/// Always refreshes the field-of-view polygon when enabled, even if the range
/// or cone test rejects the player. Returns the verdict and the number of
/// rays cast.
pub fn perceive<M: TileQuery>(
    enemy: &mut Enemy,
    player_position: Vec3,
    caster: &GridRaycaster<'_, M>,
    config: &PerceptionConfig,
    quad_size: f32,
) -> (Sight, usize) {
    let eye = world_to_grid(enemy.position, quad_size);
    let target = world_to_grid(player_position, quad_size);
    let mut rays = 0;

    if config.generate_fov_polygons {
        caster.fill_fov_polygon(
            &mut enemy.fov_polygon,
            eye,
            enemy.rotation,
            enemy.fov_half_angle * 2.0,
            enemy.sight_range,
            config.fov_ray_count,
        );
        rays += config.fov_ray_count;
    } else {
        enemy.fov_polygon.clear();
    }

    let offset = target - eye;
    let distance = offset.length();
    if !(distance <= enemy.sight_range) {
        return (Sight::OutOfRange, rays);
    }

    if distance > 0.0 {
        let bearing = offset.y.atan2(offset.x);
        let diff = normalize_angle(bearing - enemy.rotation);
        if diff.abs() > enemy.fov_half_angle {
            return (Sight::OutsideCone, rays);
        }
    }

    rays += 1;
    let sight = if caster.can_see(eye, target, config.visibility_tolerance) {
        Sight::Visible
    } else {
        Sight::Occluded
    };
    (sight, rays)
}
