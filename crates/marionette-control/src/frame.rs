use marionette_core::types::JointId;
use marionette_skeleton::BoneShape;
use nalgebra::Vector3;

use crate::error::RigError;
use crate::rig::Mode;

/// One joint as the renderer sees it: a marker sphere at a world position.
#[derive(Debug, Clone, PartialEq)]
pub struct JointView {
    pub id: JointId,
    pub name: String,
    pub position: Vector3<f32>,
    /// Roots are usually highlighted differently by consumers.
    pub is_root: bool,
    pub marker_radius: f32,
    pub selected: bool,
}

/// One bone primitive, fully placed in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneView {
    pub parent: JointId,
    pub child: JointId,
    pub shape: BoneShape,
}

/// Full-tree snapshot pulled by the geometry consumer.
///
/// Bones that could not be regenerated (for example a degenerate bone whose
/// endpoints coincide) are skipped and reported in `warnings` instead of
/// aborting the walk.
#[derive(Debug)]
pub struct Frame {
    pub mode: Mode,
    pub joints: Vec<JointView>,
    pub bones: Vec<BoneView>,
    pub warnings: Vec<RigError>,
}
