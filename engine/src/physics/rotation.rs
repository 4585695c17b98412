//! Yaw rotation in the horizontal plane.
//!
//! Yaw follows the block-world convention: 0 = South (+Z), 90 = West (-X),
//! 180 = North (-Z), 270 = East (+X). Rotating a point by +90 degrees turns a
//! south-pointing offset into a west-pointing one.
//!
//! Ships only ever rotate by multiples of 90 degrees. Floating-point sin/cos
//! of those angles is not exact (cos 90 is about 6e-17), so anything that ends
//! up as a voxel coordinate goes through [`rotate_offset`], which rounds.

use glam::{IVec3, Vec3};

/// Rotates `pos` around the Y axis by `yaw_degrees`.
///
/// `x' = x*cos - z*sin`, `z' = x*sin + z*cos`, `y` unchanged.
pub fn rotate_position(pos: Vec3, yaw_degrees: f32) -> Vec3 {
    let (sin, cos) = (yaw_degrees as f64).to_radians().sin_cos();
    let (x, z) = (pos.x as f64, pos.z as f64);
    Vec3::new(
        (x * cos - z * sin) as f32,
        pos.y,
        (x * sin + z * cos) as f32,
    )
}

/// Rotates an integer offset and rounds back onto the voxel grid.
pub fn rotate_offset(offset: IVec3, yaw_degrees: f32) -> IVec3 {
    rotate_position(offset.as_vec3(), yaw_degrees).round().as_ivec3()
}

/// Wraps a yaw angle into `[0, 360)`.
pub fn normalize_yaw(yaw_degrees: f32) -> f32 {
    let wrapped = yaw_degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Number of quarter turns (0..4) closest to `yaw_degrees`.
pub fn quarter_turns(yaw_degrees: f32) -> u8 {
    ((yaw_degrees / 90.0).round() as i64).rem_euclid(4) as u8
}

/// Snaps a yaw angle to the nearest multiple of 90 degrees in `[0, 360)`.
pub fn snap_yaw(yaw_degrees: f32) -> f32 {
    quarter_turns(yaw_degrees) as f32 * 90.0
}

/// Yaw needed to go from `from_yaw` to `to_yaw`, wrapped into `[0, 360)`.
pub fn yaw_delta(from_yaw: f32, to_yaw: f32) -> f32 {
    normalize_yaw(to_yaw - from_yaw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_maps_south_to_west() {
        let rotated = rotate_offset(IVec3::new(0, 0, 1), 90.0);
        assert_eq!(rotated, IVec3::new(-1, 0, 0));
    }

    #[test]
    fn raw_rotation_leaves_float_error_that_rounding_removes() {
        let raw = rotate_position(Vec3::new(1.0, 0.0, 0.0), 90.0);
        assert!(raw.x.abs() < 1e-6);
        assert_eq!(rotate_offset(IVec3::new(1, 0, 0), 90.0), IVec3::new(0, 0, 1));
    }

    #[test]
    fn rotation_round_trip_restores_integer_offsets() {
        for x in -4..=4 {
            for z in -4..=4 {
                let p = IVec3::new(x, 3, z);
                let back = rotate_position(rotate_position(p.as_vec3(), 90.0), -90.0);
                assert_eq!(back.round().as_ivec3(), p);
            }
        }
    }

    #[test]
    fn yaw_helpers_wrap_and_snap() {
        assert_eq!(normalize_yaw(-90.0), 270.0);
        assert_eq!(normalize_yaw(720.0), 0.0);
        assert_eq!(quarter_turns(-90.0), 3);
        assert_eq!(quarter_turns(134.0), 1);
        assert_eq!(snap_yaw(316.0), 0.0);
        assert_eq!(yaw_delta(270.0, 90.0), 180.0);
    }
}
