//! Simulation configuration
//!
//! Every tunable of the enemy, perception and door subsystems lives here.
//! Configs can be built in code with the `with_*` builders or loaded from
//! RON / JSON files; missing fields fall back to their defaults.

use std::f32::consts::FRAC_PI_4;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::world::LayerId;

/// Top-level simulation configuration
///
/// # Sizing
///
/// `enemy.collision_radius` is in world units while walls are `quad_size`
/// wide. With the defaults (`quad_size` 1.0, radius 1.0) a guard is two tiles
/// across and cannot move through a one-tile corridor or doorway, nor walk
/// within a tile of a wall. Levels with narrow passages should either raise
/// `quad_size` (3.0 leaves a 1.0-radius guard room to pass) or lower the
/// radius below `quad_size / 2`:
///
/// ```
/// use warden::core::SimulationConfig;
///
/// let config = SimulationConfig::default().with_quad_size(3.0);
/// assert!(config.enemy.collision_radius < config.quad_size / 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// World units per tile
    pub quad_size: f32,
    /// Tile layer holding walls
    pub wall_layer: LayerId,
    /// Tile layer holding doors
    pub door_layer: LayerId,
    /// Height (world Y) enemies spawn at
    pub spawn_height: f32,
    /// Enemy movement and behavior tunables
    pub enemy: EnemyConfig,
    /// Perception cadence and field of view
    pub perception: PerceptionConfig,
    /// Door animation tunables
    pub door: DoorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            quad_size: 1.0,
            wall_layer: LayerId::WALLS,
            door_layer: LayerId::DOORS,
            spawn_height: 0.0,
            enemy: EnemyConfig::default(),
            perception: PerceptionConfig::default(),
            door: DoorConfig::default(),
        }
    }
}

/// Enemy behavior tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Patrol speed in world units per second
    pub move_speed: f32,
    /// Maximum turn rate in radians per second
    pub turn_speed: f32,
    /// Radius used for collision queries, in world units
    pub collision_radius: f32,
    /// Distance at which a waypoint counts as reached, in world units
    pub arrival_threshold: f32,
    /// Seconds spent noticing before attacking
    pub notice_duration: f32,
    /// Half of the vision cone, in radians
    pub fov_half_angle: f32,
    /// Sight range in tiles
    pub sight_range: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            turn_speed: 4.0,
            collision_radius: 1.0,
            arrival_threshold: 0.5,
            notice_duration: 0.8,
            fov_half_angle: FRAC_PI_4,
            sight_range: 10.0,
        }
    }
}

/// Perception cadence and visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Perception passes per second
    pub rate_hz: f32,
    /// Rays per field-of-view polygon
    pub fov_ray_count: usize,
    /// Whether passes build the field-of-view polygon (disable for headless runs)
    pub generate_fov_polygons: bool,
    /// Slack, in tiles, when comparing a ray hit against the target distance
    pub visibility_tolerance: f32,
}

impl PerceptionConfig {
    /// Seconds between perception passes
    #[must_use]
    pub fn interval(&self) -> f32 {
        1.0 / self.rate_hz
    }
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            rate_hz: 11.0,
            fov_ray_count: 24,
            generate_fov_polygons: true,
            visibility_tolerance: 0.1,
        }
    }
}

/// Door animation tunables (door-space units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Slide distance after which an opening door counts as open
    pub slide_distance: f32,
    /// Slide speed in units per second
    pub slide_speed: f32,
    /// Seconds a door stays open before closing
    pub hold_open: f32,
    /// Distance under which a closing door snaps shut
    pub close_epsilon: f32,
    /// Maximum player distance for the interact key to open a door
    pub interaction_range: f32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            slide_distance: 1.0,
            slide_speed: 1.0,
            hold_open: 1.0,
            close_epsilon: 0.01,
            interaction_range: 1.5,
        }
    }
}

/// Replace a non-finite or non-positive value with its default.
fn sanitize(value: &mut f32, fallback: f32, name: &str) {
    if !value.is_finite() || *value <= 0.0 {
        log::warn!("config: {name} = {value} is invalid, using {fallback}");
        *value = fallback;
    }
}

impl SimulationConfig {
    /// Set world units per tile
    #[must_use]
    pub fn with_quad_size(mut self, quad_size: f32) -> Self {
        self.quad_size = quad_size;
        self
    }

    /// Set the enemy patrol speed
    #[must_use]
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.enemy.move_speed = speed;
        self
    }

    /// Set the vision cone half angle
    #[must_use]
    pub fn with_fov_half_angle(mut self, half_angle: f32) -> Self {
        self.enemy.fov_half_angle = half_angle;
        self
    }

    /// Set the sight range in tiles
    #[must_use]
    pub fn with_sight_range(mut self, range: f32) -> Self {
        self.enemy.sight_range = range;
        self
    }

    /// Enable or disable field-of-view polygon generation
    #[must_use]
    pub fn with_fov_polygons(mut self, enabled: bool) -> Self {
        self.perception.generate_fov_polygons = enabled;
        self
    }

    /// Replace invalid tunables with their defaults.
    ///
    /// Returns the number of fields that were replaced.
    pub fn validate(&mut self) -> usize {
        let before = self.clone();
        let defaults = Self::default();
        let enemy = EnemyConfig::default();
        let perception = PerceptionConfig::default();
        let door = DoorConfig::default();

        sanitize(&mut self.quad_size, defaults.quad_size, "quad_size");
        if !self.spawn_height.is_finite() {
            log::warn!("config: spawn_height is not finite, using 0");
            self.spawn_height = 0.0;
        }

        sanitize(&mut self.enemy.move_speed, enemy.move_speed, "enemy.move_speed");
        sanitize(&mut self.enemy.turn_speed, enemy.turn_speed, "enemy.turn_speed");
        sanitize(
            &mut self.enemy.collision_radius,
            enemy.collision_radius,
            "enemy.collision_radius",
        );
        sanitize(
            &mut self.enemy.arrival_threshold,
            enemy.arrival_threshold,
            "enemy.arrival_threshold",
        );
        sanitize(
            &mut self.enemy.notice_duration,
            enemy.notice_duration,
            "enemy.notice_duration",
        );
        sanitize(
            &mut self.enemy.fov_half_angle,
            enemy.fov_half_angle,
            "enemy.fov_half_angle",
        );
        sanitize(&mut self.enemy.sight_range, enemy.sight_range, "enemy.sight_range");

        sanitize(&mut self.perception.rate_hz, perception.rate_hz, "perception.rate_hz");
        sanitize(
            &mut self.perception.visibility_tolerance,
            perception.visibility_tolerance,
            "perception.visibility_tolerance",
        );

        sanitize(&mut self.door.slide_distance, door.slide_distance, "door.slide_distance");
        sanitize(&mut self.door.slide_speed, door.slide_speed, "door.slide_speed");
        sanitize(&mut self.door.hold_open, door.hold_open, "door.hold_open");
        sanitize(&mut self.door.close_epsilon, door.close_epsilon, "door.close_epsilon");
        sanitize(
            &mut self.door.interaction_range,
            door.interaction_range,
            "door.interaction_range",
        );

        let replaced = before.count_differences(self);
        if replaced > 0 {
            log::warn!("config: replaced {replaced} invalid value(s) with defaults");
        }
        replaced
    }

    fn count_differences(&self, other: &Self) -> usize {
        let pairs = [
            (self.quad_size, other.quad_size),
            (self.spawn_height, other.spawn_height),
            (self.enemy.move_speed, other.enemy.move_speed),
            (self.enemy.turn_speed, other.enemy.turn_speed),
            (self.enemy.collision_radius, other.enemy.collision_radius),
            (self.enemy.arrival_threshold, other.enemy.arrival_threshold),
            (self.enemy.notice_duration, other.enemy.notice_duration),
            (self.enemy.fov_half_angle, other.enemy.fov_half_angle),
            (self.enemy.sight_range, other.enemy.sight_range),
            (self.perception.rate_hz, other.perception.rate_hz),
            (self.perception.visibility_tolerance, other.perception.visibility_tolerance),
            (self.door.slide_distance, other.door.slide_distance),
            (self.door.slide_speed, other.door.slide_speed),
            (self.door.hold_open, other.door.hold_open),
            (self.door.close_epsilon, other.door.close_epsilon),
            (self.door.interaction_range, other.door.interaction_range),
        ];
        // bit comparison so NaN -> default counts as a change
        pairs
            .iter()
            .filter(|(a, b)| a.to_bits() != b.to_bits())
            .count()
    }

    /// Parse a config from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid config
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            ron::from_str(source).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate();
        Ok(config)
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate();
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur while loading or saving a config
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
