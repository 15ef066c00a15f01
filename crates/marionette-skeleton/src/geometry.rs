use marionette_core::types::TOLERANCE;
use nalgebra::{UnitQuaternion, Vector3};

use crate::bone::{Bone, BoneVariant};
use crate::error::GeometryError;
use crate::math::rotation_between;

// ---------------------------------------------------------------------------
// BoneShape
// ---------------------------------------------------------------------------

/// Render-ready placement of one bone primitive, derived on demand from the
/// endpoint joints' current absolute positions. Never cached across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneShape {
    pub variant: BoneVariant,
    /// Distance between the endpoint joints.
    pub length: f32,
    /// Nominal primitive radius before `scale` is applied.
    pub radius: f32,
    /// World position of the primitive anchor (midpoint for cylinders,
    /// rectangles and ellipsoids; the parent joint for cones).
    pub placement: Vector3<f32>,
    /// Rotation mapping the primitive's long axis onto the parent-to-child
    /// direction.
    pub orientation: UnitQuaternion<f32>,
    /// Per-axis scale applied after rotation, keeping lateral thickness
    /// independent of bone length.
    pub scale: Vector3<f32>,
}

/// Long axis of the unscaled primitive for each variant.
fn long_axis(variant: BoneVariant) -> Vector3<f32> {
    match variant {
        BoneVariant::Cylinder | BoneVariant::Rectangular => Vector3::z(),
        BoneVariant::Cone | BoneVariant::Ellipsoid => Vector3::y(),
    }
}

/// Derive the primitive placement for `bone` between two joint positions.
///
/// Fails with [`GeometryError::DegenerateBone`] when the endpoints coincide,
/// since a zero-length bone has no direction.
pub fn bone_shape(
    bone: &Bone,
    parent_position: &Vector3<f32>,
    child_position: &Vector3<f32>,
) -> Result<BoneShape, GeometryError> {
    let direction = child_position - parent_position;
    let length = direction.norm();
    if length < TOLERANCE {
        return Err(GeometryError::DegenerateBone {
            parent: bone.parent(),
            child: bone.child(),
        });
    }

    let variant = bone.variant();
    let thickness = bone.thickness();
    let orientation = rotation_between(&long_axis(variant), &direction);
    let midpoint = (parent_position + child_position) / 2.0;

    let shape = match variant {
        BoneVariant::Cylinder | BoneVariant::Rectangular => BoneShape {
            variant,
            length,
            radius: thickness,
            placement: midpoint,
            orientation,
            scale: Vector3::new(1.0, 1.0, 1.0),
        },
        // The cone base sits at the parent and the tip reaches the child, so
        // the nominal radius equals the length and lateral scale trims it
        // back to the configured thickness.
        BoneVariant::Cone => BoneShape {
            variant,
            length,
            radius: length,
            placement: *parent_position,
            orientation,
            scale: Vector3::new(thickness / length, 1.0, thickness / length),
        },
        BoneVariant::Ellipsoid => {
            let radius = length / 2.0;
            BoneShape {
                variant,
                length,
                radius,
                placement: midpoint,
                orientation,
                scale: Vector3::new(thickness / radius, 1.0, thickness / radius),
            }
        }
    };
    Ok(shape)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
