//! Core simulation module
//!
//! Contains the [`Simulation`] tick loop, configuration, events and counters

pub mod math;

mod config;
mod events;
mod simulation;
mod stats;

pub use config::{ConfigError, DoorConfig, EnemyConfig, PerceptionConfig, SimulationConfig};
pub use events::{EventQueue, SimEvent};
pub use simulation::Simulation;
pub use stats::SimulationStats;
