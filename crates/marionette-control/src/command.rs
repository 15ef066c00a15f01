use nalgebra::{Unit, Vector3};

/// Rotation plane for a forward kinematics command.
///
/// A rotation "in" a plane spins about the axis normal to it, so XY maps to
/// the Z axis and so on. Event sign conventions (for example an inverted
/// drag while a modifier key is held) are resolved by the caller; this layer
/// only receives the final signed magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPlane {
    XY,
    YZ,
    XZ,
}

impl AxisPlane {
    /// World axis normal to the plane.
    pub fn axis(self) -> Unit<Vector3<f32>> {
        match self {
            AxisPlane::XY => Vector3::z_axis(),
            AxisPlane::YZ => Vector3::x_axis(),
            AxisPlane::XZ => Vector3::y_axis(),
        }
    }
}
