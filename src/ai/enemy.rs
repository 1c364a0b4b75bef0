//! Enemy data
//!
//! Enemies are spawned from [`EnemyPlacement`] records and owned by the
//! [`EnemySystem`](super::EnemySystem). Everything here is readable by the
//! presentation layer; only the AI mutates it.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::fsm::{BehaviorMachine, EnemyState};
use super::patrol::PatrolRoute;
use crate::core::math::wrap_tau;

/// Spawn record for one enemy, in tile coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    /// Spawn tile X
    pub tile_x: i32,
    /// Spawn tile Y (world Z)
    pub tile_y: i32,
    /// Initial facing, in radians
    #[serde(default)]
    pub rotation: f32,
    /// Patrol waypoints as tile coordinates
    #[serde(default)]
    pub patrol_waypoints: Vec<(i32, i32)>,
}

impl EnemyPlacement {
    /// Create a stationary placement
    #[must_use]
    pub fn new(tile_x: i32, tile_y: i32, rotation: f32) -> Self {
        Self {
            tile_x,
            tile_y,
            rotation,
            patrol_waypoints: Vec::new(),
        }
    }

    /// Add patrol waypoints
    #[must_use]
    pub fn with_patrol(mut self, waypoints: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.patrol_waypoints = waypoints.into_iter().collect();
        self
    }
}

/// Which of the 8 sprite columns to draw, as seen by the player.
///
/// Computed by the AI because it depends on the enemy's facing; the renderer
/// only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpriteFacing {
    /// Column of the 8-direction sprite sheet
    pub column: u8,
    /// Angle used to pick the column, in `[0, TAU)`
    pub angle: f32,
    /// Horizontal distance from the player
    pub distance: f32,
}

impl SpriteFacing {
    /// Columns on the sprite sheet
    pub const COLUMNS: u8 = 8;

    /// Compute the facing for an enemy at `enemy` with facing `rotation`,
    /// viewed from `viewer`.
    #[must_use]
    pub fn compute(viewer: Vec3, enemy: Vec3, rotation: f32) -> Self {
        let to_enemy = Vec2::new(enemy.x - viewer.x, enemy.z - viewer.z);
        let distance = to_enemy.length();
        let view_angle = if distance > 0.0 {
            to_enemy.y.atan2(to_enemy.x)
        } else {
            0.0
        };

        // Quarter turn aligns the angle with the sheet's column order
        let angle = wrap_tau(wrap_tau(rotation - view_angle) + FRAC_PI_2);
        let slices = f32::from(Self::COLUMNS);
        let column = ((angle / TAU * slices).round() as u32 % u32::from(Self::COLUMNS)) as u8;

        Self {
            column,
            angle,
            distance,
        }
    }
}

/// A guard
#[derive(Debug, Clone)]
pub struct Enemy {
    /// World position
    pub(crate) position: Vec3,
    /// Facing angle in radians
    pub(crate) rotation: f32,
    pub(crate) move_speed: f32,
    pub(crate) machine: BehaviorMachine,
    pub(crate) patrol: PatrolRoute,

    /// Last perception verdict; held between passes
    pub(crate) can_see_player: bool,
    pub(crate) fov_half_angle: f32,
    /// Sight range in tiles
    pub(crate) sight_range: f32,
    /// Grid-space field-of-view fan, for visualization only
    pub(crate) fov_polygon: Vec<Vec2>,

    pub(crate) sprite: SpriteFacing,
}

impl Enemy {
    /// Spawn an idle enemy
    #[must_use]
    pub fn new(position: Vec3, rotation: f32, move_speed: f32, patrol: PatrolRoute) -> Self {
        Self {
            position,
            rotation,
            move_speed,
            machine: BehaviorMachine::new(EnemyState::Idle),
            patrol,
            can_see_player: false,
            fov_half_angle: std::f32::consts::FRAC_PI_4,
            sight_range: 10.0,
            fov_polygon: Vec::new(),
            sprite: SpriteFacing::default(),
        }
    }

    /// Set the vision cone
    #[must_use]
    pub fn with_vision(mut self, fov_half_angle: f32, sight_range: f32) -> Self {
        self.fov_half_angle = fov_half_angle;
        self.sight_range = sight_range;
        self
    }

    /// World position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Facing angle in radians
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Patrol speed in world units per second
    #[must_use]
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Current behavior state
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.machine.state()
    }

    /// Seconds since the last state change
    #[must_use]
    pub fn state_timer(&self) -> f32 {
        self.machine.state_timer()
    }

    /// Patrol route
    #[must_use]
    pub fn patrol(&self) -> &PatrolRoute {
        &self.patrol
    }

    /// Result of the last perception pass
    #[must_use]
    pub fn can_see_player(&self) -> bool {
        self.can_see_player
    }

    /// Half of the vision cone, in radians
    #[must_use]
    pub fn fov_half_angle(&self) -> f32 {
        self.fov_half_angle
    }

    /// Sight range in tiles
    #[must_use]
    pub fn sight_range(&self) -> f32 {
        self.sight_range
    }

    /// Field-of-view fan from the last perception pass (grid space)
    #[must_use]
    pub fn fov_polygon(&self) -> &[Vec2] {
        &self.fov_polygon
    }

    /// Sprite column and view data for the renderer
    #[must_use]
    pub fn sprite(&self) -> SpriteFacing {
        self.sprite
    }

    /// Force a state change, as [`BehaviorMachine::transition_to`].
    ///
    /// Meant for scripted sequences and tests; normal play goes through the
    /// behavior update.
    pub fn transition_to(&mut self, state: EnemyState) -> Option<EnemyState> {
        self.machine.transition_to(state)
    }
}
