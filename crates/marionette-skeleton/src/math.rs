use marionette_core::types::TOLERANCE;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Shortest-arc rotation mapping `from` onto `to`.
///
/// Neither input needs to be normalized; both must be non-zero. For
/// anti-parallel inputs the rotation axis is ambiguous, so a half-turn is
/// taken about a canonical substitute axis (X, or Y when `from` already
/// lies along X).
pub fn rotation_between(from: &Vector3<f32>, to: &Vector3<f32>) -> UnitQuaternion<f32> {
    let dot = from.dot(to);
    let lengths = (from.norm_squared() * to.norm_squared()).sqrt();

    if (dot / lengths + 1.0).abs() < TOLERANCE {
        // Anti-parallel: any perpendicular axis works. Prefer X unless
        // `from` already lies along it.
        let axis = if from.dot(&Vector3::x()).abs() < 1.0 {
            Vector3::x_axis()
        } else {
            Vector3::y_axis()
        };
        return UnitQuaternion::from_axis_angle(&axis, std::f32::consts::PI);
    }

    let cross = from.cross(to);
    UnitQuaternion::new_normalize(Quaternion::new(dot + lengths, cross.x, cross.y, cross.z))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_between_maps_from_onto_to() {
        let from = Vector3::new(0.0, 0.0, 1.0);
        let to = Vector3::new(1.0, 0.0, 0.0);
        let q = rotation_between(&from, &to);
        let rotated = q * from;
        assert_relative_eq!(rotated.x, to.x, epsilon = 1e-5);
        assert_relative_eq!(rotated.y, to.y, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, to.z, epsilon = 1e-5);
    }

    #[test]
    fn rotation_between_non_unit_inputs() {
        let from = Vector3::new(0.0, 0.0, 2.0);
        let to = Vector3::new(0.0, 3.0, 0.0);
        let q = rotation_between(&from, &to);
        let rotated = q * from;
        // Direction matches `to`; magnitude of `from` is preserved.
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_between_parallel_is_identity() {
        let from = Vector3::new(0.5, 1.0, -2.0);
        let q = rotation_between(&from, &(from * 3.0));
        let rotated = q * from;
        assert_relative_eq!(rotated.x, from.x, epsilon = 1e-5);
        assert_relative_eq!(rotated.y, from.y, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, from.z, epsilon = 1e-5);
    }

    #[test]
    fn rotation_between_anti_parallel_z() {
        let from = Vector3::new(0.0, 0.0, 1.0);
        let to = Vector3::new(0.0, 0.0, -1.0);
        let q = rotation_between(&from, &to);
        let rotated = q * from;
        assert_relative_eq!(rotated.x, to.x, epsilon = 1e-5);
        assert_relative_eq!(rotated.y, to.y, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, to.z, epsilon = 1e-5);
    }

    #[test]
    fn rotation_between_anti_parallel_x() {
        // `from` along X forces the fallback perpendicular axis.
        let from = Vector3::new(1.0, 0.0, 0.0);
        let to = Vector3::new(-1.0, 0.0, 0.0);
        let q = rotation_between(&from, &to);
        let rotated = q * from;
        assert_relative_eq!(rotated.x, to.x, epsilon = 1e-5);
        assert_relative_eq!(rotated.y, to.y, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, to.z, epsilon = 1e-5);
    }

    #[test]
    fn rotation_between_anti_parallel_y() {
        let from = Vector3::new(0.0, 2.0, 0.0);
        let to = Vector3::new(0.0, -5.0, 0.0);
        let q = rotation_between(&from, &to);
        let rotated = q * from;
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.y, -2.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, 0.0, epsilon = 1e-5);
    }
}
