//! Simulation events
//!
//! Double-buffered queue of things that happened during a tick. Events pushed
//! while tick N runs become readable once tick N+1 starts, so the
//! presentation layer (barks, door sounds, debug overlays) sees a consistent
//! set no matter where in the tick it was produced.
//!
//! # Design Notes
//!
//! - **Edges, not levels**: events report changes (a state entered, the
//!   player spotted); current values are read from the simulation itself
//! - **One tick of lifetime**: [`EventQueue::swap`] drops whatever the
//!   previous tick produced, so consumers must read every tick
//! - **Plain data**: events carry indices and ids, never references, and are
//!   `Copy`
//!
//! # Example
//!
//! ```ignore
//! sim.update(dt, &player, interact);
//! for event in sim.events().iter() {
//!     if let SimEvent::PlayerSpotted { enemy } = event {
//!         play_bark(*enemy);
//!     }
//! }
//! ```

use crate::ai::EnemyState;
use crate::door::{DoorId, DoorState};

// ============================================================================
// Event Types
// ============================================================================

/// Something that happened in the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum SimEvent {
    /// An enemy's behavior state changed
    EnemyStateChanged {
        /// Index of the enemy
        enemy: usize,
        /// Previous state
        from: EnemyState,
        /// New state
        to: EnemyState,
    },

    /// A perception pass found the player after not seeing them
    PlayerSpotted {
        /// Index of the enemy
        enemy: usize,
    },

    /// A perception pass lost sight of the player
    PlayerLost {
        /// Index of the enemy
        enemy: usize,
    },

    /// A door's animation state changed
    DoorStateChanged {
        /// The door
        door: DoorId,
        /// Previous state
        from: DoorState,
        /// New state
        to: DoorState,
    },

    /// A door was told to open
    DoorOpenRequested {
        /// The door
        door: DoorId,
        /// Enemy that requested it, `None` for the player
        by_enemy: Option<usize>,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue.
///
/// Events pushed during tick N become readable when tick N+1 calls
/// [`EventQueue::swap`]; anything not read by then is dropped.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    /// Written during the current tick
    incoming: Vec<SimEvent>,
    /// Produced by the previous tick
    readable: Vec<SimEvent>,
}

impl EventQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event for the next tick
    #[inline]
    pub fn push(&mut self, event: SimEvent) {
        self.incoming.push(event);
    }

    /// Publish this tick's events and start collecting the next batch.
    ///
    /// Called once at the start of each simulation update.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.incoming, &mut self.readable);
        self.incoming.clear();
    }

    /// Events from the previous tick, in the order they happened
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.readable.iter()
    }

    /// Take the previous tick's events
    pub fn drain(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.readable.drain(..)
    }

    /// Previous-tick events concerning one enemy
    pub fn for_enemy(&self, index: usize) -> impl Iterator<Item = &SimEvent> {
        self.readable.iter().filter(move |event| match event {
            SimEvent::EnemyStateChanged { enemy, .. }
            | SimEvent::PlayerSpotted { enemy }
            | SimEvent::PlayerLost { enemy } => *enemy == index,
            SimEvent::DoorOpenRequested { by_enemy, .. } => *by_enemy == Some(index),
            SimEvent::DoorStateChanged { .. } => false,
        })
    }

    /// Check if the previous tick produced nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readable.is_empty()
    }

    /// Number of readable events
    #[must_use]
    pub fn len(&self) -> usize {
        self.readable.len()
    }

    /// Number of events recorded so far this tick
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.incoming.len()
    }

    /// Drop everything, readable or not
    pub fn clear(&mut self) {
        self.incoming.clear();
        self.readable.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
