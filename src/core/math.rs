//! Angle helpers shared by the raycaster, perception and behavior code
//!
//! Facing angles follow the sprite convention: an angle `r` looks along
//! `(cos r, sin r)` in the horizontal (x, z) plane.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

/// Normalize an angle difference into `[-PI, PI]`.
///
/// Values already in range are returned bit-for-bit unchanged.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle;
    while a > PI {
        a -= TAU;
    }
    while a < -PI {
        a += TAU;
    }
    a
}

/// Wrap an angle into `[0, TAU)`.
#[must_use]
pub fn wrap_tau(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Facing angle for a horizontal world-space direction.
///
/// Rotates the raw direction into the billboard facing space used by the
/// renderer: `atan2(x, -z) - PI/2`.
#[must_use]
pub fn facing_angle(direction: Vec3) -> f32 {
    direction.x.atan2(-direction.z) - FRAC_PI_2
}

/// Unit vector for a facing angle, in (x, z) / grid-space axes.
#[must_use]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Horizontal (x, z) part of a world position.
#[inline]
#[must_use]
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_wrap_tau() {
        assert!((wrap_tau(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert!(wrap_tau(TAU) < 1e-5);
        let w = wrap_tau(-1e-9);
        assert!((0.0..TAU).contains(&w));
    }

    #[test]
    fn test_facing_angle_matches_heading() {
        for dir in [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Z, Vec3::new(1.0, 0.0, 1.0)] {
            let heading = heading_vector(facing_angle(dir));
            let expected = horizontal(dir).normalize();
            assert!((heading - expected).length() < 1e-5, "{dir:?}");
        }
    }

    #[test]
    fn test_facing_angle_positive_x_is_zero() {
        assert!(facing_angle(Vec3::X).abs() < 1e-6);
    }
}
