//! Enemy behavior system
//!
//! Owns the live enemies. Each tick it runs a perception pass when one is due
//! and then steps every enemy's state machine in list order.
//!
//! | State | Behavior |
//! |---|---|
//! | Idle | sees player -> Noticing; has patrol -> Walking |
//! | Walking | sees player -> Noticing; else patrol step |
//! | Noticing | turn to player; lost -> Walking/Idle; after notice time -> Attacking |
//! | Attacking | turn to player; lost -> Walking/Idle |
//! | Colliding | retry the patrol step |
//! | Fleeing, Dying | nothing |

use glam::Vec3;

use super::enemy::{Enemy, EnemyPlacement, SpriteFacing};
use super::fsm::{EnemyState, Transition};
use super::patrol::{PatrolRoute, PatrolStep};
use super::perception::{PerceptionClock, perceive};
use crate::core::math::{facing_angle, horizontal, normalize_angle};
use crate::core::{EventQueue, SimEvent, SimulationConfig, SimulationStats};
use crate::door::{DoorCommand, DoorRegistry};
use crate::world::{CollisionOracle, GridRaycaster, TileQuery};

/// The player, as seen by the AI. Never mutated by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Player {
    /// World position
    pub position: Vec3,
    /// Facing angle in radians
    pub rotation: f32,
}

impl Player {
    /// Create a player at a position
    #[must_use]
    pub fn new(position: Vec3, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

/// Everything an enemy update reads or writes outside the enemy list
pub struct AiContext<'a, M: TileQuery> {
    /// Level tiles
    pub map: &'a M,
    /// Doors, read-only during the AI update
    pub doors: &'a DoorRegistry,
    /// Move legality
    pub collision: &'a dyn CollisionOracle,
    /// The player
    pub player: &'a Player,
    /// Door requests, applied by the caller after the update
    pub commands: &'a mut Vec<DoorCommand>,
    /// Event sink
    pub events: &'a mut EventQueue,
    /// Counters
    pub stats: &'a mut SimulationStats,
}

/// Owner of all live enemies
#[derive(Debug, Clone)]
pub struct EnemySystem {
    enemies: Vec<Enemy>,
    clock: PerceptionClock,
    config: SimulationConfig,
}

impl EnemySystem {
    /// Create an empty system
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            enemies: Vec::new(),
            clock: PerceptionClock::new(config.perception.interval()),
            config,
        }
    }

    /// Live enemies, in update order
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Get an enemy
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Enemy> {
        self.enemies.get(index)
    }

    /// Get an enemy mutably, for scripted sequences
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Enemy> {
        self.enemies.get_mut(index)
    }

    /// Number of live enemies
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Check if there are no enemies
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn tile_to_world(&self, x: i32, y: i32) -> Vec3 {
        let q = self.config.quad_size;
        Vec3::new(x as f32 * q, self.config.spawn_height, y as f32 * q)
    }

    /// Replace every enemy with fresh ones built from `placements`.
    ///
    /// Tile coordinates outside the map are clamped onto its edge. Must not
    /// run while an update is in progress.
    pub fn rebuild(&mut self, placements: &[EnemyPlacement], map: &impl TileQuery) {
        let max_x = (map.width() - 1).max(0);
        let max_y = (map.height() - 1).max(0);
        let mut clamped = 0;
        let mut clamp = |x: i32, y: i32| {
            let c = (x.clamp(0, max_x), y.clamp(0, max_y));
            if c != (x, y) {
                clamped += 1;
                log::warn!("Placement tile ({x}, {y}) outside the map, clamped to {c:?}");
            }
            c
        };

        let enemy_config = &self.config.enemy;
        let mut enemies = Vec::with_capacity(placements.len());
        for placement in placements {
            let (sx, sy) = clamp(placement.tile_x, placement.tile_y);
            let origin = self.tile_to_world(sx, sy);
            let waypoints: Vec<Vec3> = placement
                .patrol_waypoints
                .iter()
                .map(|&(x, y)| {
                    let (wx, wy) = clamp(x, y);
                    self.tile_to_world(wx, wy)
                })
                .collect();
            let rotation = if placement.rotation.is_finite() {
                placement.rotation
            } else {
                0.0
            };

            enemies.push(
                Enemy::new(
                    origin,
                    rotation,
                    enemy_config.move_speed,
                    PatrolRoute::new(origin, waypoints),
                )
                .with_vision(enemy_config.fov_half_angle, enemy_config.sight_range),
            );
        }

        let patrolling = enemies.iter().filter(|e| e.patrol.has_path()).count();
        log::info!(
            "Rebuilt {} enemies ({} patrolling, {} coordinate(s) clamped)",
            enemies.len(),
            patrolling,
            clamped
        );

        self.enemies = enemies;
        self.clock.reset();
    }

    /// Advance all enemies by one tick
    pub fn update<M: TileQuery>(&mut self, dt: f32, ctx: &mut AiContext<'_, M>) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }

        if self.clock.tick(dt) {
            self.perceive_all(ctx);
        }

        for index in 0..self.enemies.len() {
            self.step_enemy(index, dt, ctx);
        }

        let viewer = ctx.player.position;
        for enemy in &mut self.enemies {
            enemy.sprite = SpriteFacing::compute(viewer, enemy.position, enemy.rotation);
        }
    }

    /// Run a full perception pass over every enemy
    pub fn perceive_all<M: TileQuery>(&mut self, ctx: &mut AiContext<'_, M>) {
        let caster = GridRaycaster::new(ctx.map, ctx.doors, self.config.wall_layer);
        let player = ctx.player.position;

        ctx.stats.perception_passes += 1;
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            let (sight, rays) = perceive(
                enemy,
                player,
                &caster,
                &self.config.perception,
                self.config.quad_size,
            );
            ctx.stats.rays_cast += rays as u64;

            let visible = sight.is_visible();
            log::trace!("Enemy {index}: {sight:?}");
            if visible != enemy.can_see_player {
                ctx.events.push(if visible {
                    SimEvent::PlayerSpotted { enemy: index }
                } else {
                    SimEvent::PlayerLost { enemy: index }
                });
            }
            enemy.can_see_player = visible;
        }
    }

    fn step_enemy<M: TileQuery>(&mut self, index: usize, dt: f32, ctx: &mut AiContext<'_, M>) {
        let config = &self.config;
        let Some(enemy) = self.enemies.get_mut(index) else {
            return;
        };

        enemy.machine.tick(dt);

        let sees = enemy.can_see_player;
        let has_path = enemy.patrol.has_path();
        let fallback = if has_path {
            EnemyState::Walking
        } else {
            EnemyState::Idle
        };

        let transition = match enemy.state() {
            EnemyState::Idle => {
                if sees {
                    Transition::To(EnemyState::Noticing)
                } else if has_path {
                    Transition::To(EnemyState::Walking)
                } else {
                    Transition::None
                }
            }
            EnemyState::Walking => {
                if sees {
                    Transition::To(EnemyState::Noticing)
                } else if has_path {
                    patrol_step(index, enemy, dt, config, ctx)
                } else {
                    Transition::To(EnemyState::Idle)
                }
            }
            EnemyState::Noticing => {
                rotate_to_face(enemy, ctx.player.position, config.enemy.turn_speed, dt);
                if !sees {
                    Transition::To(fallback)
                } else if enemy.state_timer() >= config.enemy.notice_duration {
                    Transition::To(EnemyState::Attacking)
                } else {
                    Transition::None
                }
            }
            EnemyState::Attacking => {
                rotate_to_face(enemy, ctx.player.position, config.enemy.turn_speed, dt);
                if sees {
                    Transition::None
                } else {
                    Transition::To(fallback)
                }
            }
            EnemyState::Colliding => {
                if has_path {
                    patrol_step(index, enemy, dt, config, ctx)
                } else {
                    Transition::None
                }
            }
            EnemyState::Fleeing | EnemyState::Dying => Transition::None,
        };

        if let Some(from) = enemy.machine.apply(transition) {
            let to = enemy.state();
            log::debug!("Enemy {index}: {from} -> {to}");
            ctx.events.push(SimEvent::EnemyStateChanged {
                enemy: index,
                from,
                to,
            });
        }
    }
}

/// One patrol step: move towards the current stop, or snap to it and advance.
///
/// A refused move puts the enemy in `Colliding` and, when a door is in the
/// way, asks for the closest door to open.
fn patrol_step<M: TileQuery>(
    index: usize,
    enemy: &mut Enemy,
    dt: f32,
    config: &SimulationConfig,
    ctx: &mut AiContext<'_, M>,
) -> Transition {
    let step = enemy.patrol.plan(
        enemy.position,
        enemy.move_speed,
        dt,
        config.enemy.arrival_threshold,
    );

    match step {
        PatrolStep::Hold => Transition::None,
        PatrolStep::Arrive { target } => {
            enemy.position.x = target.x;
            enemy.position.z = target.z;
            enemy.patrol.advance();
            Transition::None
        }
        PatrolStep::Move { next, direction } => {
            let radius = config.enemy.collision_radius;
            if !ctx.collision.check_collision_at_position(next, radius) {
                enemy.position = next;
                enemy.rotation = facing_angle(direction);
                return Transition::To(EnemyState::Walking);
            }

            ctx.stats.collisions += 1;
            // Only ask for the closest door when its own panel refused the move
            let next_xz = horizontal(next);
            let door_space = next_xz / config.quad_size;
            if ctx.doors.is_door_blocking(next_xz, radius, config.quad_size)
                && let Some(door) = ctx.doors.find_closest_door(door_space)
                && ctx
                    .doors
                    .get(door)
                    .is_some_and(|d| d.blocks_circle(door_space, radius / config.quad_size))
            {
                log::debug!("Enemy {index} blocked by door {}, requesting open", door.0);
                ctx.stats.door_requests += 1;
                ctx.commands.push(DoorCommand::Open { door, enemy: index });
            }
            Transition::To(EnemyState::Colliding)
        }
    }
}

/// Turn towards a point at no more than `turn_speed` radians per second,
/// snapping onto the exact bearing once it is within one step.
pub fn rotate_to_face(enemy: &mut Enemy, target: Vec3, turn_speed: f32, dt: f32) {
    let to_target = Vec3::new(target.x - enemy.position.x, 0.0, target.z - enemy.position.z);
    if to_target.length_squared() <= f32::EPSILON {
        return;
    }

    let target_angle = facing_angle(to_target);
    let diff = normalize_angle(target_angle - enemy.rotation);
    let max_turn = turn_speed * dt;

    if diff.abs() <= max_turn {
        enemy.rotation = target_angle;
    } else {
        enemy.rotation = normalize_angle(enemy.rotation + max_turn.copysign(diff));
    }
}
