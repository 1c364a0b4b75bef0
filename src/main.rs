//! Headless demo: two guards patrol through sliding doors while a scripted
//! player wanders the level.
//!
//! Usage: `warden [config.ron]`

use warden::prelude::*;

const LEVEL: &[&str] = &[
    "################",
    "#......#.......#",
    "#......#.......#",
    "#......D.......#",
    "#......#.......#",
    "#......#.......#",
    "###D####.......#",
    "#..............#",
    "################",
];

const TICK_RATE: f32 = 60.0;
const DURATION_SECS: f32 = 30.0;
const REPORT_EVERY_SECS: f32 = 5.0;

/// Player walking back and forth along fixed tile waypoints
struct ScriptedWalk {
    points: Vec<Vec3>,
    segment: usize,
    forward: bool,
    speed: f32,
    player: Player,
}

impl ScriptedWalk {
    fn new(tiles: &[(f32, f32)], quad_size: f32, speed: f32) -> Self {
        let points: Vec<Vec3> = tiles
            .iter()
            .map(|&(x, y)| Vec3::new(x * quad_size, 0.0, y * quad_size))
            .collect();
        let start = points.first().copied().unwrap_or(Vec3::ZERO);
        Self {
            points,
            segment: 0,
            forward: true,
            speed,
            player: Player::new(start, 0.0),
        }
    }

    fn target(&self) -> Option<Vec3> {
        let index = if self.forward {
            self.segment + 1
        } else {
            self.segment
        };
        self.points.get(index).copied()
    }

    fn step(&mut self, dt: f32) {
        if self.points.len() < 2 {
            return;
        }
        let Some(target) = self.target() else {
            return;
        };

        let to_target = target - self.player.position;
        let distance = to_target.length();
        let step = self.speed * dt;
        if distance <= step {
            self.player.position = target;
            if self.forward {
                if self.segment + 2 < self.points.len() {
                    self.segment += 1;
                } else {
                    self.forward = false;
                }
            } else if self.segment > 0 {
                self.segment -= 1;
            } else {
                self.forward = true;
            }
        } else {
            let direction = to_target / distance;
            self.player.position += direction * step;
            self.player.rotation = direction.z.atan2(direction.x);
        }
    }
}

fn load_config() -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(SimulationConfig::load_ron(&path)?),
        None => Ok(SimulationConfig::default().with_quad_size(3.0)),
    }
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::PlayerSpotted { enemy } => log::info!("Guard {enemy} spotted the player"),
        SimEvent::PlayerLost { enemy } => log::info!("Guard {enemy} lost the player"),
        SimEvent::DoorOpenRequested { door, by_enemy } => match by_enemy {
            Some(enemy) => log::info!("Guard {enemy} opened door {}", door.0),
            None => log::info!("Player opened door {}", door.0),
        },
        other => log::debug!("{other:?}"),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let mut sim = Simulation::new(TileMap::from_ascii(LEVEL), config);
    let quad_size = sim.config().quad_size;
    sim.rebuild(&[
        EnemyPlacement::new(2, 3, 0.0).with_patrol([(10, 3)]),
        EnemyPlacement::new(10, 7, std::f32::consts::PI).with_patrol([(3, 7), (3, 4), (3, 7)]),
    ]);

    let mut walk = ScriptedWalk::new(
        &[(13.0, 2.0), (13.0, 6.0), (9.0, 7.0), (9.0, 2.0)],
        quad_size,
        1.5 * quad_size,
    );

    let dt = 1.0 / TICK_RATE;
    let ticks = (DURATION_SECS * TICK_RATE) as u64;
    let report_every = (REPORT_EVERY_SECS * TICK_RATE) as u64;

    for tick in 1..=ticks {
        walk.step(dt);
        let interact = tick % TICK_RATE as u64 == 0;
        sim.update(dt, &walk.player, interact);

        for event in sim.events().iter() {
            log_event(event);
        }

        if tick % report_every == 0 {
            log::info!("{}", sim.format_stats());
            for (i, enemy) in sim.enemies().iter().enumerate() {
                let p = enemy.position();
                log::info!(
                    "  guard {i}: {:<9} at ({:.1}, {:.1}) facing {:.2} rad, sprite column {}",
                    enemy.state().name(),
                    p.x / quad_size,
                    p.z / quad_size,
                    enemy.rotation(),
                    enemy.sprite().column
                );
            }
        }
    }

    log::info!("Finished: {}", sim.format_stats());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Simulation error: {}", e);
        std::process::exit(1);
    }
}
