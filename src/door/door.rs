//! A single sliding door and its animation state machine
//!
//! Positions are in door space (`world.xz / quad_size`): a door built from
//! tile `(i, j)` starts closed at `(i, j)` and slides along its axis.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::DoorConfig;

/// Stable index of a door inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoorId(pub usize);

/// Axis a door slides along, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorAxis {
    /// Slides along door-space X
    Horizontal,
    /// Slides along door-space Y (world Z)
    Vertical,
}

impl DoorAxis {
    /// Unit slide direction
    #[must_use]
    pub fn direction(self) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::X,
            Self::Vertical => Vec2::Y,
        }
    }
}

/// Door animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    /// State name for debugging and logging
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Closed => "Closed",
            Self::Opening => "Opening",
            Self::Open => "Open",
            Self::Closing => "Closing",
        }
    }
}

/// A sliding door
#[derive(Debug, Clone)]
pub struct Door {
    /// Current, animated position
    pub(crate) position: Vec2,
    /// Closed position
    start_position: Vec2,
    axis: DoorAxis,
    pub(crate) state: DoorState,
    /// Seconds spent fully open
    pub(crate) time_open: f32,
    /// Seconds since the last open command
    pub(crate) time_opening: f32,
}

impl Door {
    /// Create a closed door at a door-space position
    #[must_use]
    pub fn new(start_position: Vec2, axis: DoorAxis) -> Self {
        Self {
            position: start_position,
            start_position,
            axis,
            state: DoorState::Closed,
            time_open: 0.0,
            time_opening: 0.0,
        }
    }

    /// Current (animated) position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Closed position
    #[must_use]
    pub fn start_position(&self) -> Vec2 {
        self.start_position
    }

    /// Slide axis
    #[must_use]
    pub fn axis(&self) -> DoorAxis {
        self.axis
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Seconds spent fully open
    #[must_use]
    pub fn time_open(&self) -> f32 {
        self.time_open
    }

    /// Seconds since the last open command
    #[must_use]
    pub fn time_opening(&self) -> f32 {
        self.time_opening
    }

    /// How far the door has slid from its closed position
    #[must_use]
    pub fn slide_offset(&self) -> f32 {
        self.position.distance(self.start_position)
    }

    /// A door blocks movement and sight unless it is fully open
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.state != DoorState::Open
    }

    /// Tile the door occupies when closed
    #[must_use]
    pub fn tile(&self) -> (i32, i32) {
        (
            self.start_position.x.round() as i32,
            self.start_position.y.round() as i32,
        )
    }

    /// Distance from a door-space point to the door's centerline along its
    /// slide axis.
    #[must_use]
    pub fn centerline_distance(&self, point: Vec2) -> f32 {
        match self.axis {
            DoorAxis::Horizontal => (point.y - self.start_position.y).abs(),
            DoorAxis::Vertical => (point.x - self.start_position.x).abs(),
        }
    }

    /// Check if a door-space circle overlaps the panel.
    ///
    /// The panel spans one tile along the slide axis, centered on the closed
    /// position. Until the door is fully open the whole panel counts, even
    /// while it is sliding.
    #[must_use]
    pub fn blocks_circle(&self, center: Vec2, radius: f32) -> bool {
        if !self.is_blocking() {
            return false;
        }
        let half = self.axis.direction() * 0.5;
        let a = self.start_position - half;
        let b = self.start_position + half;
        let t = (center - a).dot(b - a).clamp(0.0, 1.0);
        let closest = a + (b - a) * t;
        closest.distance_squared(center) < radius * radius
    }

    /// Start (or restart) opening.
    ///
    /// Always zeroes both timers, even when the door is already open, which
    /// keeps a door open for another full hold period.
    pub fn open(&mut self) {
        self.state = DoorState::Opening;
        self.time_open = 0.0;
        self.time_opening = 0.0;
    }

    /// Advance the animation by one tick.
    ///
    /// Returns the previous state if the door changed state this tick.
    pub fn animate(&mut self, dt: f32, config: &DoorConfig) -> Option<DoorState> {
        let previous = self.state;

        match self.state {
            DoorState::Closed => {}
            DoorState::Opening => {
                self.time_opening += dt;
                if self.slide_offset() > config.slide_distance {
                    self.state = DoorState::Open;
                } else {
                    self.position += self.axis.direction() * config.slide_speed * dt;
                }
            }
            DoorState::Open => {
                self.time_open += dt;
                if self.time_open > config.hold_open {
                    self.state = DoorState::Closing;
                }
            }
            DoorState::Closing => {
                let offset = self.slide_offset();
                if offset < config.close_epsilon {
                    self.position = self.start_position;
                    self.time_open = 0.0;
                    self.state = DoorState::Closed;
                } else {
                    // Never slide past the closed position
                    let step = (config.slide_speed * dt).min(offset);
                    self.position -= self.axis.direction() * step;
                }
            }
        }

        (self.state != previous).then_some(previous)
    }
}
