use quaternion_core::{Quaternion, Vector3};

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degree(angle: f32) -> f32 {
    let ret = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if ret >= 360.0 {
        0.0
    } else {
        ret
    }
}

/// Signed rotation in degrees that takes `from` onto `to` the short way
/// round. The result lies in (-180, 180].
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Rotation of `q` about the unit vector `axis` (twist part of a
/// swing-twist split), in degrees within [0, 360).
pub fn get_twist_degree(q: Quaternion<f32>, axis: Vector3<f32>) -> f32 {
    let along = quaternion_core::dot(q.1, axis);
    normalize_degree((2.0 * along.atan2(q.0)).to_degrees())
}

pub fn from_axis_degree(axis: Vector3<f32>, angle: f32) -> Quaternion<f32> {
    quaternion_core::from_axis_angle(axis, angle.to_radians())
}
