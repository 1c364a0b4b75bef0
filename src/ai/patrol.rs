//! Patrol loops
//!
//! A route visits its waypoints in order and then returns to the spot the
//! enemy spawned on before starting over, so the loop has one more stop than
//! there are waypoints.

use glam::Vec3;
use smallvec::SmallVec;

/// Waypoints stored inline before spilling to the heap
pub type Waypoints = SmallVec<[Vec3; 8]>;

/// What a patrolling enemy should do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatrolStep {
    /// No patrol path
    Hold,
    /// Close enough to the current stop: snap to it and advance
    Arrive {
        /// The stop that was reached
        target: Vec3,
    },
    /// Move towards the current stop
    Move {
        /// Candidate position after this tick's step
        next: Vec3,
        /// Unit horizontal direction of travel
        direction: Vec3,
    },
}

/// A waypoint loop with an implicit return to its origin
#[derive(Debug, Clone, Default)]
pub struct PatrolRoute {
    waypoints: Waypoints,
    /// Index into the loop of `waypoints.len() + 1` stops
    current: usize,
    origin: Vec3,
}

impl PatrolRoute {
    /// Create a route that returns to `origin` after the last waypoint
    pub fn new(origin: Vec3, waypoints: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
            current: 0,
            origin,
        }
    }

    /// Check if there is anything to patrol
    #[must_use]
    pub fn has_path(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Waypoints, without the return-to-origin stop
    #[must_use]
    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    /// Return point, fixed at spawn
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Index of the current stop; `waypoints().len()` means the origin
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of stops in the loop
    #[must_use]
    pub fn loop_len(&self) -> usize {
        self.waypoints.len() + 1
    }

    /// Current stop, or `None` without a path
    #[must_use]
    pub fn target(&self) -> Option<Vec3> {
        if !self.has_path() {
            return None;
        }
        Some(self.waypoints.get(self.current).copied().unwrap_or(self.origin))
    }

    /// Move on to the next stop of the loop
    pub fn advance(&mut self) {
        if self.has_path() {
            self.current = (self.current + 1) % self.loop_len();
        }
    }

    /// Decide this tick's patrol step.
    ///
    /// Only the horizontal (x, z) distance counts; height is ignored and
    /// preserved.
    #[must_use]
    pub fn plan(&self, position: Vec3, move_speed: f32, dt: f32, arrival_threshold: f32) -> PatrolStep {
        let Some(target) = self.target() else {
            return PatrolStep::Hold;
        };

        let to_target = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
        let distance = to_target.length();

        if distance > arrival_threshold {
            let direction = to_target / distance;
            let step = (move_speed * dt).min(distance);
            PatrolStep::Move {
                next: position + direction * step,
                direction,
            }
        } else {
            PatrolStep::Arrive { target }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_route() -> PatrolRoute {
        PatrolRoute::new(
            Vec3::ZERO,
            [Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0)],
        )
    }

    #[test]
    fn test_empty_route_holds() {
        let mut route = PatrolRoute::new(Vec3::ONE, Vec::<Vec3>::new());
        assert!(!route.has_path());
        assert_eq!(route.target(), None);
        route.advance();
        assert_eq!(route.current_index(), 0);
        assert_eq!(route.plan(Vec3::ZERO, 2.0, 0.1, 0.5), PatrolStep::Hold);
    }

    #[test]
    fn test_loop_includes_origin() {
        let mut route = square_route();
        assert_eq!(route.loop_len(), 3);

        let mut targets = Vec::new();
        for _ in 0..6 {
            targets.push(route.target().unwrap());
            route.advance();
        }
        assert_eq!(
            targets,
            vec![
                Vec3::new(4.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 4.0),
                Vec3::ZERO,
                Vec3::new(4.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 4.0),
                Vec3::ZERO,
            ]
        );
    }

    #[test]
    fn test_plan_step_is_clamped() {
        let route = square_route();

        match route.plan(Vec3::ZERO, 2.0, 0.1, 0.5) {
            PatrolStep::Move { next, direction } => {
                assert!((next - Vec3::new(0.2, 0.0, 0.0)).length() < 1e-6);
                assert_eq!(direction, Vec3::X);
            }
            other => panic!("expected move, got {other:?}"),
        }

        // A huge step never passes the target
        match route.plan(Vec3::ZERO, 100.0, 1.0, 0.5) {
            PatrolStep::Move { next, .. } => {
                assert!((next - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_ignores_height() {
        let route = square_route();

        let step = route.plan(Vec3::new(3.7, 10.0, 0.0), 2.0, 0.1, 0.5);
        assert_eq!(step, PatrolStep::Arrive { target: Vec3::new(4.0, 0.0, 0.0) });

        match route.plan(Vec3::new(0.0, 10.0, 0.0), 2.0, 0.1, 0.5) {
            PatrolStep::Move { next, direction } => {
                assert_eq!(next.y, 10.0);
                assert_eq!(direction.y, 0.0);
            }
            other => panic!("expected move, got {other:?}"),
        }
    }
}
