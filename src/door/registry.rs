//! Door registry
//!
//! Owns every door of the level. Other systems read doors through the query
//! methods and change them only through [`DoorRegistry::open_door`] or a
//! [`DoorCommand`].

use glam::Vec2;
use rustc_hash::FxHashMap;

use super::door::{Door, DoorAxis, DoorId, DoorState};
use crate::core::{DoorConfig, EventQueue, SimEvent};
use crate::world::{LayerId, TileQuery};

/// A request to change a door, issued by a system that only holds a shared
/// borrow of the registry during its update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    /// Open a door on behalf of an enemy
    Open {
        /// Door to open
        door: DoorId,
        /// Index of the requesting enemy
        enemy: usize,
    },
}

/// All doors of a level
#[derive(Debug, Clone, Default)]
pub struct DoorRegistry {
    doors: Vec<Door>,
    /// Closed-position tile -> door
    by_tile: FxHashMap<(i32, i32), DoorId>,
    config: DoorConfig,
}

impl DoorRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(config: DoorConfig) -> Self {
        Self {
            doors: Vec::new(),
            by_tile: FxHashMap::default(),
            config,
        }
    }

    /// Build one door per non-empty tile of `door_layer`.
    ///
    /// A door with a wall to its west or east slides horizontally, any other
    /// door slides vertically.
    #[must_use]
    pub fn from_tiles(
        map: &impl TileQuery,
        door_layer: LayerId,
        wall_layer: LayerId,
        config: DoorConfig,
    ) -> Self {
        let mut registry = Self::new(config);

        for y in 0..map.height() {
            for x in 0..map.width() {
                if map.tile(door_layer, x, y) == 0 {
                    continue;
                }
                let walled_sideways =
                    map.tile(wall_layer, x - 1, y) > 0 || map.tile(wall_layer, x + 1, y) > 0;
                let axis = if walled_sideways {
                    DoorAxis::Horizontal
                } else {
                    DoorAxis::Vertical
                };
                registry.add(Door::new(Vec2::new(x as f32, y as f32), axis));
            }
        }

        log::info!("Door registry built with {} door(s)", registry.doors.len());
        registry
    }

    /// Register a door. Doors are only added while a level is being built.
    pub fn add(&mut self, door: Door) -> DoorId {
        let id = DoorId(self.doors.len());
        self.by_tile.entry(door.tile()).or_insert(id);
        self.doors.push(door);
        id
    }

    /// Number of doors
    #[must_use]
    pub fn len(&self) -> usize {
        self.doors.len()
    }

    /// Check if the registry has no doors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    /// Get a door
    #[must_use]
    pub fn get(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(id.0)
    }

    /// Iterate over all doors in creation order
    pub fn iter(&self) -> impl Iterator<Item = (DoorId, &Door)> {
        self.doors.iter().enumerate().map(|(i, d)| (DoorId(i), d))
    }

    /// Door whose closed position lies on a tile
    #[must_use]
    pub fn door_at_tile(&self, x: i32, y: i32) -> Option<(DoorId, &Door)> {
        let id = *self.by_tile.get(&(x, y))?;
        self.get(id).map(|door| (id, door))
    }

    /// Check if a blocking door occupies a tile
    #[must_use]
    pub fn is_tile_blocked(&self, x: i32, y: i32) -> bool {
        self.door_at_tile(x, y)
            .is_some_and(|(_, door)| door.is_blocking())
    }

    /// Door closest to a door-space position.
    ///
    /// Ties go to the door created first.
    #[must_use]
    pub fn find_closest_door(&self, position: Vec2) -> Option<DoorId> {
        let mut best: Option<(DoorId, f32)> = None;
        for (id, door) in self.iter() {
            let distance = door.position().distance(position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Check if a door blocks a circle at a world position.
    ///
    /// Only the closest door is considered. It blocks when it is not fully
    /// open and the circle reaches its slide-axis centerline.
    #[must_use]
    pub fn is_door_blocking(&self, world_position: Vec2, radius: f32, quad_size: f32) -> bool {
        if quad_size <= 0.0 {
            return false;
        }
        let position = world_position / quad_size;
        let radius = radius / quad_size;

        self.find_closest_door(position)
            .and_then(|id| self.get(id))
            .is_some_and(|door| door.is_blocking() && door.centerline_distance(position) < radius)
    }

    /// Check if any door's panel overlaps a circle at a world position.
    ///
    /// This is the movement test. Unlike [`Self::is_door_blocking`] it only
    /// reaches one tile along each door, so a door never stops a circle that
    /// crosses its line elsewhere on the map.
    #[must_use]
    pub fn overlaps_door(&self, world_position: Vec2, radius: f32, quad_size: f32) -> bool {
        if quad_size <= 0.0 {
            return false;
        }
        let center = world_position / quad_size;
        let radius = radius / quad_size;
        self.doors.iter().any(|door| door.blocks_circle(center, radius))
    }

    /// Start opening a door.
    ///
    /// Restarts the timers of a door that is already opening or open.
    pub fn open_door(&mut self, id: DoorId) -> bool {
        let Some(door) = self.doors.get_mut(id.0) else {
            log::warn!("open_door: no door {id:?}");
            return false;
        };
        log::debug!("Door {} opening (was {})", id.0, door.state().name());
        door.open();
        true
    }

    /// Apply a command issued during the AI update
    pub fn apply(&mut self, command: DoorCommand, events: &mut EventQueue) {
        match command {
            DoorCommand::Open { door, enemy } => {
                if self.open_door(door) {
                    events.push(SimEvent::DoorOpenRequested {
                        door,
                        by_enemy: Some(enemy),
                    });
                }
            }
        }
    }

    /// Per-tick update: player interaction, then animation.
    ///
    /// `player_position` is in door space. Pressing interact opens the closest
    /// door if it lies within the configured interaction range.
    pub fn update(
        &mut self,
        dt: f32,
        interact_pressed: bool,
        player_position: Vec2,
        events: &mut EventQueue,
    ) {
        if interact_pressed
            && let Some(id) = self.find_closest_door(player_position)
            && self
                .get(id)
                .is_some_and(|d| d.position().distance(player_position) <= self.config.interaction_range)
            && self.open_door(id)
        {
            events.push(SimEvent::DoorOpenRequested {
                door: id,
                by_enemy: None,
            });
        }

        self.animate(dt, events);
    }

    /// Advance every door's animation by one tick
    pub fn animate(&mut self, dt: f32, events: &mut EventQueue) {
        for (i, door) in self.doors.iter_mut().enumerate() {
            if let Some(from) = door.animate(dt, &self.config) {
                let to = door.state();
                log::debug!("Door {i}: {} -> {}", from.name(), to.name());
                events.push(SimEvent::DoorStateChanged {
                    door: DoorId(i),
                    from,
                    to,
                });
            }
        }
    }

    /// Count doors in a state
    #[must_use]
    pub fn count_in_state(&self, state: DoorState) -> usize {
        self.doors.iter().filter(|d| d.state() == state).count()
    }
}
