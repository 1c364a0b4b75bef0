//! Enemy behavior state machine
//!
//! The machine is a tagged state plus the time spent in it. Behavior code
//! dispatches on [`EnemyState`] once per tick and reports the outcome as a
//! [`Transition`]; the machine owns the timer and resets it only when the
//! state actually changes.
//!
//! # Design Notes
//!
//! - **Closed set of states**: behavior is a `match` over one enum, so the
//!   dispatch table lives in a single place and every state is handled
//! - **Timer ownership**: [`BehaviorMachine::tick`] advances the timer and
//!   only a real state change resets it; a transition to the current state
//!   is a no-op and keeps it running
//! - **Reserved states**: `Fleeing` and `Dying` exist for later systems and
//!   have no entry edges yet
//!
//! # Example
//!
//! ```ignore
//! let mut machine = BehaviorMachine::new(EnemyState::Idle);
//! machine.tick(dt);
//! let transition = match machine.state() {
//!     EnemyState::Idle if can_see_player => Transition::To(EnemyState::Noticing),
//!     _ => Transition::None,
//! };
//! machine.apply(transition);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Enemy State
// ============================================================================

/// Behavior state of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyState {
    /// Standing still
    #[default]
    Idle,
    /// Following the patrol loop
    Walking,
    /// Saw the player, turning towards them
    Noticing,
    /// Reserved; nothing transitions here yet
    Fleeing,
    /// Facing the player and attacking
    Attacking,
    /// Reserved for a damage system; terminal
    Dying,
    /// Last patrol step was blocked
    Colliding,
}

impl EnemyState {
    /// All states, in declaration order
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Walking,
        Self::Noticing,
        Self::Fleeing,
        Self::Attacking,
        Self::Dying,
        Self::Colliding,
    ];

    /// State name for debugging and logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walking => "Walking",
            Self::Noticing => "Noticing",
            Self::Fleeing => "Fleeing",
            Self::Attacking => "Attacking",
            Self::Dying => "Dying",
            Self::Colliding => "Colliding",
        }
    }

    /// Whether the state turns to track the player
    #[must_use]
    pub fn tracks_player(self) -> bool {
        matches!(self, Self::Noticing | Self::Attacking)
    }
}

impl fmt::Display for EnemyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Transition
// ============================================================================

/// Represents a state transition decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the current state.
    None,
    /// Switch to a state.
    To(EnemyState),
}

// ============================================================================
// Behavior Machine
// ============================================================================

/// Current state plus the seconds spent in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorMachine {
    state: EnemyState,
    state_timer: f32,
}

impl BehaviorMachine {
    /// Create a machine in an initial state
    #[must_use]
    pub fn new(initial: EnemyState) -> Self {
        Self {
            state: initial,
            state_timer: 0.0,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Seconds since the last state change
    #[must_use]
    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    /// Check if the machine is in a state
    #[must_use]
    pub fn is_in_state(&self, state: EnemyState) -> bool {
        self.state == state
    }

    /// Advance the state timer
    pub fn tick(&mut self, dt: f32) {
        self.state_timer += dt;
    }

    /// Switch state.
    ///
    /// Switching to the current state does nothing and keeps the timer.
    /// Otherwise the timer restarts and the previous state is returned.
    pub fn transition_to(&mut self, new_state: EnemyState) -> Option<EnemyState> {
        if new_state == self.state {
            return None;
        }
        let previous = self.state;
        self.state = new_state;
        self.state_timer = 0.0;
        Some(previous)
    }

    /// Apply a transition decision
    pub fn apply(&mut self, transition: Transition) -> Option<EnemyState> {
        match transition {
            Transition::None => None,
            Transition::To(state) => self.transition_to(state),
        }
    }
}

impl Default for BehaviorMachine {
    fn default() -> Self {
        Self::new(EnemyState::Idle)
    }
}

// ============================================================================
// Tests
// ============================================================================
