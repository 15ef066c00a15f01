use marionette_core::types::JointId;

// ---------------------------------------------------------------------------
// BoneVariant
// ---------------------------------------------------------------------------

/// Shape of the primitive rendered between two joints.
///
/// Tagged at bone creation and immutable for the bone's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneVariant {
    Cylinder,
    Cone,
    Ellipsoid,
    Rectangular,
}

impl BoneVariant {
    /// Radial tessellation hint for mesh builders. Rectangular bones are
    /// four-sided cylinders.
    pub const fn radial_segments(self) -> u32 {
        match self {
            BoneVariant::Cylinder | BoneVariant::Cone => 20,
            BoneVariant::Rectangular => 4,
            BoneVariant::Ellipsoid => 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Bone
// ---------------------------------------------------------------------------

/// Directed edge between a parent joint and a child joint.
///
/// Stores only the shape variant and thickness; length and orientation are
/// derived on demand from the endpoint joints' absolute positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    parent: JointId,
    child: JointId,
    variant: BoneVariant,
    thickness: f32,
}

impl Bone {
    pub const DEFAULT_THICKNESS: f32 = 0.1;

    pub const fn new(parent: JointId, child: JointId, variant: BoneVariant) -> Self {
        Self {
            parent,
            child,
            variant,
            thickness: Self::DEFAULT_THICKNESS,
        }
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    pub const fn parent(&self) -> JointId {
        self.parent
    }

    pub const fn child(&self) -> JointId {
        self.child
    }

    pub const fn variant(&self) -> BoneVariant {
        self.variant
    }

    pub const fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.thickness = thickness;
    }
}

// ---------------------------------------------------------------------------
// JointMarker
// ---------------------------------------------------------------------------

/// Sphere rendered at a joint origin, sized by the joint's role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointMarker {
    radius: f32,
}

impl JointMarker {
    /// Radius for the root joint marker.
    pub const ROOT_RADIUS: f32 = 0.3;
    /// Radius for joints whose incoming bone is a cone (the tip sits at the
    /// joint, so the marker shrinks out of its way).
    pub const CONE_TIP_RADIUS: f32 = 0.08;
    /// Radius for every other joint.
    pub const DEFAULT_RADIUS: f32 = 0.2;

    /// Marker for a joint given its incoming bone variant (`None` for the
    /// root, which has no incoming bone).
    pub const fn for_joint(bone_variant: Option<BoneVariant>) -> Self {
        let radius = match bone_variant {
            None => Self::ROOT_RADIUS,
            Some(BoneVariant::Cone) => Self::CONE_TIP_RADIUS,
            Some(_) => Self::DEFAULT_RADIUS,
        };
        Self { radius }
    }

    pub const fn radius(&self) -> f32 {
        self.radius
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
