//! DDA grid raycasting
//!
//! All inputs and outputs are in grid space: a point's tile index is its
//! `floor`. Rays stop at walls, at doors that are not fully open and at the
//! edge of the map, which counts as a wall.

use glam::Vec2;

use crate::door::DoorRegistry;
use crate::world::{LayerId, TileQuery};

/// Why a ray stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayStop {
    /// Reached `max_distance` without hitting anything
    MaxDistance,
    /// Left the grid
    OutOfBounds,
    /// Entered a wall tile
    Wall,
    /// Entered the tile of a blocking door
    Door,
}

/// Result of a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Where the ray stopped
    pub point: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
    /// What stopped it
    pub stop: RayStop,
    /// Tile the ray stopped in, if it hit something
    pub tile: Option<(i32, i32)>,
}

/// Raycaster over a tile map and its doors
#[derive(Debug, Clone, Copy)]
pub struct GridRaycaster<'a, M: TileQuery> {
    map: &'a M,
    doors: &'a DoorRegistry,
    wall_layer: LayerId,
}

impl<'a, M: TileQuery> GridRaycaster<'a, M> {
    /// Create a raycaster
    pub fn new(map: &'a M, doors: &'a DoorRegistry, wall_layer: LayerId) -> Self {
        Self {
            map,
            doors,
            wall_layer,
        }
    }

    /// Cast a ray and return the point where it stops
    #[must_use]
    pub fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Vec2 {
        self.cast(origin, direction, max_distance).point
    }

    /// Cast a ray with the DDA algorithm.
    ///
    /// A near-zero direction returns `origin` unchanged. Ties between the next
    /// X and Y boundaries step along X.
    #[must_use]
    pub fn cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> RayHit {
        let miss = |distance: f32, point: Vec2| RayHit {
            point,
            distance,
            stop: RayStop::MaxDistance,
            tile: None,
        };

        let length = direction.length();
        if !(length > 1e-6) || !origin.is_finite() || max_distance.is_nan() {
            return miss(0.0, origin);
        }
        let dir = direction / length;
        let max_distance = max_distance.max(0.0);

        let mut map_x = origin.x.floor() as i32;
        let mut map_y = origin.y.floor() as i32;

        let delta_x = if dir.x == 0.0 { f32::INFINITY } else { (1.0 / dir.x).abs() };
        let delta_y = if dir.y == 0.0 { f32::INFINITY } else { (1.0 / dir.y).abs() };

        let (step_x, mut side_x) = if dir.x == 0.0 {
            (0, f32::INFINITY)
        } else if dir.x < 0.0 {
            (-1, (origin.x - map_x as f32) * delta_x)
        } else {
            (1, (map_x as f32 + 1.0 - origin.x) * delta_x)
        };
        let (step_y, mut side_y) = if dir.y == 0.0 {
            (0, f32::INFINITY)
        } else if dir.y < 0.0 {
            (-1, (origin.y - map_y as f32) * delta_y)
        } else {
            (1, (map_y as f32 + 1.0 - origin.y) * delta_y)
        };

        loop {
            let distance = if side_y < side_x {
                map_y += step_y;
                let d = side_y;
                side_y += delta_y;
                d
            } else {
                map_x += step_x;
                let d = side_x;
                side_x += delta_x;
                d
            };

            if distance > max_distance {
                return miss(max_distance, origin + dir * max_distance);
            }

            let stop = if !self.map.in_bounds(map_x, map_y) {
                RayStop::OutOfBounds
            } else if self.map.tile(self.wall_layer, map_x, map_y) > 0 {
                RayStop::Wall
            } else if self.doors.is_tile_blocked(map_x, map_y) {
                RayStop::Door
            } else {
                continue;
            };

            return RayHit {
                point: origin + dir * distance,
                distance,
                stop,
                tile: Some((map_x, map_y)),
            };
        }
    }

    /// Check for a clear line of sight between two grid-space points.
    ///
    /// `tolerance` absorbs rounding when the ray stops on the boundary of the
    /// target tile.
    #[must_use]
    pub fn can_see(&self, start: Vec2, end: Vec2, tolerance: f32) -> bool {
        let distance = start.distance(end);
        if !distance.is_finite() {
            return false;
        }
        let hit = self.cast_ray(start, end - start, distance);
        hit.distance(start) >= distance - tolerance
    }

    /// Fan of rays across a field of view.
    ///
    /// The first point is `origin`, followed by the hit point of each of
    /// `ray_count` rays spread evenly over `facing ± fov / 2`, both edges
    /// included.
    #[must_use]
    pub fn generate_fov_polygon(
        &self,
        origin: Vec2,
        facing: f32,
        fov: f32,
        max_distance: f32,
        ray_count: usize,
    ) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(ray_count + 1);
        self.fill_fov_polygon(&mut points, origin, facing, fov, max_distance, ray_count);
        points
    }

    /// Same as [`Self::generate_fov_polygon`], reusing `points`' allocation
    pub fn fill_fov_polygon(
        &self,
        points: &mut Vec<Vec2>,
        origin: Vec2,
        facing: f32,
        fov: f32,
        max_distance: f32,
        ray_count: usize,
    ) {
        points.clear();
        points.push(origin);

        match ray_count {
            0 => {}
            1 => points.push(self.cast_ray(origin, Vec2::from_angle(facing), max_distance)),
            _ => {
                let start = facing - fov / 2.0;
                let step = fov / (ray_count - 1) as f32;
                for i in 0..ray_count {
                    let angle = start + step * i as f32;
                    points.push(self.cast_ray(origin, Vec2::from_angle(angle), max_distance));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DoorConfig;
    use crate::door::{Door, DoorAxis, DoorId};
    use crate::world::TileMap;

    const EPS: f32 = 1e-4;

    fn open_grid() -> TileMap {
        TileMap::new(16, 16, 2)
    }

    #[test]
    fn test_ray_reaches_max_distance_on_open_grid() {
        let map = open_grid();
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let origin = Vec2::new(5.5, 5.5);
        for dir in [Vec2::X, Vec2::new(1.0, 1.0), Vec2::new(-0.3, 0.7), Vec2::NEG_Y] {
            let hit = caster.cast(origin, dir, 3.0);
            assert_eq!(hit.stop, RayStop::MaxDistance);
            let expected = origin + dir.normalize() * 3.0;
            assert!((hit.point - expected).length() < EPS, "{dir:?}");
        }
    }

    #[test]
    fn test_ray_stops_at_near_face_of_wall() {
        let mut map = open_grid();
        map.set_tile(LayerId::WALLS, 8, 5, 1);
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let hit = caster.cast(Vec2::new(5.5, 5.5), Vec2::X, 10.0);
        assert_eq!(hit.stop, RayStop::Wall);
        assert_eq!(hit.tile, Some((8, 5)));
        assert!((hit.point.x - 8.0).abs() < EPS);
        assert!((hit.point.y - 5.5).abs() < EPS);

        // Approaching from the other side stops on the far face
        let hit = caster.cast(Vec2::new(12.5, 5.5), Vec2::NEG_X, 10.0);
        assert!((hit.point.x - 9.0).abs() < EPS);

        // Diagonal rays never end inside the wall tile
        let hit = caster.cast(Vec2::new(6.2, 3.1), Vec2::new(1.0, 1.0), 10.0);
        if hit.stop == RayStop::Wall {
            let inside = hit.point.x > 8.0 + EPS
                && hit.point.x < 9.0 - EPS
                && hit.point.y > 5.0 + EPS
                && hit.point.y < 6.0 - EPS;
            assert!(!inside);
        }
    }

    #[test]
    fn test_grid_edge_is_a_wall() {
        let map = open_grid();
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let hit = caster.cast(Vec2::new(14.5, 3.5), Vec2::X, 100.0);
        assert_eq!(hit.stop, RayStop::OutOfBounds);
        assert!((hit.point.x - 16.0).abs() < EPS);

        let hit = caster.cast(Vec2::new(2.5, 1.5), Vec2::NEG_Y, 100.0);
        assert_eq!(hit.stop, RayStop::OutOfBounds);
        assert!(hit.point.y.abs() < EPS);
    }

    #[test]
    fn test_zero_direction_returns_origin() {
        let map = open_grid();
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let origin = Vec2::new(3.3, 4.4);
        assert_eq!(caster.cast_ray(origin, Vec2::ZERO, 5.0), origin);
        assert_eq!(caster.cast_ray(origin, Vec2::splat(1e-9), 5.0), origin);
        assert_eq!(caster.cast_ray(origin, Vec2::NAN, 5.0), origin);
    }

    #[test]
    fn test_diagonal_tie_steps_x_first() {
        let mut map = open_grid();
        // Wall only on the X-neighbour of the corner crossing
        map.set_tile(LayerId::WALLS, 6, 5, 1);
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let hit = caster.cast(Vec2::new(5.5, 5.5), Vec2::new(1.0, 1.0), 10.0);
        assert_eq!(hit.stop, RayStop::Wall);
        assert_eq!(hit.tile, Some((6, 5)));
    }

    #[test]
    fn test_closed_door_blocks_open_door_does_not() {
        let map = open_grid();
        let mut doors = DoorRegistry::new(DoorConfig::default());
        doors.add(Door::new(Vec2::new(8.0, 5.0), DoorAxis::Vertical));

        let origin = Vec2::new(5.5, 5.5);
        {
            let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);
            let hit = caster.cast(origin, Vec2::X, 10.0);
            assert_eq!(hit.stop, RayStop::Door);
            assert!((hit.point.x - 8.0).abs() < EPS);
        }

        let mut events = crate::core::EventQueue::new();
        doors.open_door(DoorId(0));
        for _ in 0..15 {
            doors.animate(0.1, &mut events);
        }
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);
        assert_eq!(caster.cast(origin, Vec2::X, 10.0).stop, RayStop::OutOfBounds);
    }

    #[test]
    fn test_can_see_symmetric_on_open_grid() {
        let map = open_grid();
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let points = [
            Vec2::new(0.5, 0.5),
            Vec2::new(15.5, 15.5),
            Vec2::new(3.2, 11.7),
            Vec2::new(9.0, 9.0),
            Vec2::new(12.25, 2.75),
        ];
        for a in points {
            for b in points {
                assert_eq!(caster.can_see(a, b, 0.1), caster.can_see(b, a, 0.1));
                assert!(caster.can_see(a, b, 0.1), "{a:?} -> {b:?}");
            }
        }
    }

    #[test]
    fn test_can_see_blocked_by_wall() {
        let mut map = open_grid();
        map.set_tile(LayerId::WALLS, 7, 5, 1);
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        assert!(!caster.can_see(Vec2::new(5.5, 5.5), Vec2::new(9.5, 5.5), 0.1));
        assert!(!caster.can_see(Vec2::new(9.5, 5.5), Vec2::new(5.5, 5.5), 0.1));
        assert!(caster.can_see(Vec2::new(5.5, 6.5), Vec2::new(9.5, 6.5), 0.1));
    }

    #[test]
    fn test_can_see_coincident_points() {
        let map = open_grid();
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);
        assert!(caster.can_see(Vec2::new(4.5, 4.5), Vec2::new(4.5, 4.5), 0.1));
    }

    #[test]
    fn test_fov_polygon_layout() {
        let map = open_grid();
        let doors = DoorRegistry::default();
        let caster = GridRaycaster::new(&map, &doors, LayerId::WALLS);

        let origin = Vec2::new(8.5, 8.5);
        let fov = std::f32::consts::FRAC_PI_2;
        let polygon = caster.generate_fov_polygon(origin, 0.0, fov, 4.0, 5);
        assert_eq!(polygon.len(), 6);
        assert_eq!(polygon[0], origin);

        // Edges at facing ± fov/2, middle ray straight ahead
        let first = (polygon[1] - origin).normalize();
        let middle = (polygon[3] - origin).normalize();
        let last = (polygon[5] - origin).normalize();
        assert!((first - Vec2::from_angle(-fov / 2.0)).length() < EPS);
        assert!((middle - Vec2::X).length() < EPS);
        assert!((last - Vec2::from_angle(fov / 2.0)).length() < EPS);

        assert_eq!(caster.generate_fov_polygon(origin, 0.0, fov, 4.0, 0), vec![origin]);
        assert_eq!(caster.generate_fov_polygon(origin, 0.0, fov, 4.0, 1).len(), 2);
    }
}
