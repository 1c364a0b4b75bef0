//! Per-tick orchestration of doors, perception and enemy behavior

use crate::ai::{AiContext, Enemy, EnemyPlacement, EnemySystem, Player};
use crate::core::math::horizontal;
use crate::core::{EventQueue, SimulationConfig, SimulationStats};
use crate::door::{DoorCommand, DoorId, DoorRegistry, DoorState};
use crate::world::{LevelCollision, TileMap, TileQuery};

/// The simulation core: level, doors, enemies and their bookkeeping.
///
/// Single-threaded and frame-stepped. Call [`Simulation::update`] once per
/// frame; everything it does completes before it returns.
pub struct Simulation<M: TileQuery = TileMap> {
    map: M,
    doors: DoorRegistry,
    enemies: EnemySystem,
    /// Door requests collected during the AI step
    commands: Vec<DoorCommand>,
    events: EventQueue,
    stats: SimulationStats,
    config: SimulationConfig,
}

impl<M: TileQuery> Simulation<M> {
    /// Create a simulation over a level. Doors are built from the door layer.
    pub fn new(map: M, mut config: SimulationConfig) -> Self {
        config.validate();

        let doors =
            DoorRegistry::from_tiles(&map, config.door_layer, config.wall_layer, config.door.clone());
        log::info!(
            "Simulation created: {}x{} tiles, quad size {}, {} door(s)",
            map.width(),
            map.height(),
            config.quad_size,
            doors.len()
        );

        Self {
            map,
            doors,
            enemies: EnemySystem::new(config.clone()),
            commands: Vec::new(),
            events: EventQueue::new(),
            stats: SimulationStats::new(),
            config,
        }
    }

    /// Replace all enemies with fresh ones from placement records.
    ///
    /// Doors are not touched.
    pub fn rebuild(&mut self, placements: &[EnemyPlacement]) {
        self.enemies.rebuild(placements, &self.map);
        self.commands.clear();
    }

    /// Advance one tick.
    ///
    /// Doors animate first, then perception (when due) and enemy behavior.
    /// Doors requested by enemies start moving on the next tick.
    pub fn update(&mut self, dt: f32, player: &Player, interact_pressed: bool) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }

        self.events.swap();
        self.stats.record_tick(dt);

        let player_door_space = horizontal(player.position) / self.config.quad_size;
        self.doors
            .update(dt, interact_pressed, player_door_space, &mut self.events);

        let collision = LevelCollision::new(
            &self.map,
            &self.doors,
            self.config.wall_layer,
            self.config.quad_size,
        );
        let mut ctx = AiContext {
            map: &self.map,
            doors: &self.doors,
            collision: &collision,
            player,
            commands: &mut self.commands,
            events: &mut self.events,
            stats: &mut self.stats,
        };
        self.enemies.update(dt, &mut ctx);

        for command in self.commands.drain(..) {
            self.doors.apply(command, &mut self.events);
        }
    }

    /// Open a door directly, as a scripted trigger would
    pub fn open_door(&mut self, id: DoorId) -> bool {
        self.doors.open_door(id)
    }

    /// Level tiles
    #[must_use]
    pub fn map(&self) -> &M {
        &self.map
    }

    /// Door registry
    #[must_use]
    pub fn doors(&self) -> &DoorRegistry {
        &self.doors
    }

    /// Live enemies, in update order
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        self.enemies.enemies()
    }

    /// Enemy owner, for scripted sequences
    pub fn enemy_system_mut(&mut self) -> &mut EnemySystem {
        &mut self.enemies
    }

    /// Events produced during the previous tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Running counters
    #[must_use]
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Configuration in use, after validation
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// One-line summary for logs and debug overlays
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "{} | Enemies: {} | Doors open/moving: {}/{}",
            self.stats.format_stats(),
            self.enemies.len(),
            self.doors.count_in_state(DoorState::Open),
            self.doors.len() - self.doors.count_in_state(DoorState::Closed)
        )
    }
}
