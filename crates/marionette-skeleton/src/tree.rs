use std::collections::HashMap;

use marionette_core::types::JointId;
use nalgebra::{UnitQuaternion, Vector3};

use crate::bone::{Bone, BoneVariant, JointMarker};
use crate::error::TopologyError;

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// A node of the skeleton.
///
/// Stores its translation and rotation relative to its parent plus a cached
/// absolute (world) translation. The relative translation is fixed at
/// attachment time; rotations compose into `relative_rotation` and the tree
/// refreshes cached absolutes for the affected subtree.
#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    parent: Option<JointId>,
    children: Vec<JointId>,
    relative_translation: Vector3<f32>,
    relative_rotation: UnitQuaternion<f32>,
    absolute_translation: Vector3<f32>,
    bone: Option<Bone>,
    marker: JointMarker,
}

impl Joint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn parent(&self) -> Option<JointId> {
        self.parent
    }

    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Translation relative to the parent joint's frame. Zero for the root.
    pub fn relative_translation(&self) -> &Vector3<f32> {
        &self.relative_translation
    }

    /// Accumulated local rotation. Identity until the joint is rotated.
    pub fn relative_rotation(&self) -> &UnitQuaternion<f32> {
        &self.relative_rotation
    }

    /// Cached world-space position of the joint origin.
    pub fn absolute_translation(&self) -> &Vector3<f32> {
        &self.absolute_translation
    }

    /// The bone connecting this joint to its parent. `None` for the root.
    pub fn bone(&self) -> Option<&Bone> {
        self.bone.as_ref()
    }

    pub const fn marker(&self) -> JointMarker {
        self.marker
    }

    pub fn children(&self) -> impl Iterator<Item = JointId> + '_ {
        self.children.iter().copied()
    }
}

// ---------------------------------------------------------------------------
// JointTree
// ---------------------------------------------------------------------------

/// Arena-backed joint hierarchy with forward kinematic propagation.
///
/// Joints are appended and never removed, so a parent's id is always smaller
/// than its children's. Names are unique across the whole tree and double as
/// a secondary lookup key.
#[derive(Debug, Clone)]
pub struct JointTree {
    joints: Vec<Joint>,
    names: HashMap<String, JointId>,
    root: JointId,
}

impl JointTree {
    /// Create a tree holding only the root joint at `world_position`.
    pub fn new(name: impl Into<String>, world_position: Vector3<f32>) -> Self {
        let name = name.into();
        let root = JointId::new(0);
        let joint = Joint {
            name: name.clone(),
            parent: None,
            children: Vec::new(),
            relative_translation: Vector3::zeros(),
            relative_rotation: UnitQuaternion::identity(),
            absolute_translation: world_position,
            bone: None,
            marker: JointMarker::for_joint(None),
        };
        let mut names = HashMap::new();
        names.insert(name, root);
        Self {
            joints: vec![joint],
            names,
            root,
        }
    }

    /// Attach a new joint under `parent` at the given world position.
    ///
    /// The relative translation is derived from the parent's current absolute
    /// position, and a bone of the given variant is created between the two.
    pub fn add_child(
        &mut self,
        name: impl Into<String>,
        parent: JointId,
        world_position: Vector3<f32>,
        variant: BoneVariant,
    ) -> Result<JointId, TopologyError> {
        let name = name.into();
        let parent_absolute = *self.get(parent)?.absolute_translation();
        if self.names.contains_key(&name) {
            return Err(TopologyError::DuplicateName(name));
        }

        let id = JointId::new(self.joints.len() as u32);
        self.joints.push(Joint {
            name: name.clone(),
            parent: Some(parent),
            children: Vec::new(),
            relative_translation: world_position - parent_absolute,
            relative_rotation: UnitQuaternion::identity(),
            absolute_translation: world_position,
            bone: Some(Bone::new(parent, id, variant)),
            marker: JointMarker::for_joint(Some(variant)),
        });
        self.joints[parent.index()].children.push(id);
        self.names.insert(name, id);
        Ok(id)
    }

    pub fn get(&self, joint: JointId) -> Result<&Joint, TopologyError> {
        self.joints
            .get(joint.index())
            .ok_or(TopologyError::UnknownJoint(joint))
    }

    pub fn get_mut(&mut self, joint: JointId) -> Result<&mut Joint, TopologyError> {
        self.joints
            .get_mut(joint.index())
            .ok_or(TopologyError::UnknownJoint(joint))
    }

    pub const fn root(&self) -> JointId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joint_by_name(&self, name: &str) -> Option<JointId> {
        self.names.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = JointId> {
        (0..self.joints.len() as u32).map(JointId::new)
    }

    /// All joints in arena order (parents before children).
    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Joint)> + '_ {
        self.joints
            .iter()
            .enumerate()
            .map(|(index, joint)| (JointId::new(index as u32), joint))
    }

    pub fn children(
        &self,
        joint: JointId,
    ) -> Result<impl Iterator<Item = JointId> + '_, TopologyError> {
        Ok(self.get(joint)?.children())
    }

    /// World-space position of a joint origin.
    pub fn position(&self, joint: JointId) -> Result<Vector3<f32>, TopologyError> {
        Ok(*self.get(joint)?.absolute_translation())
    }

    /// All bones in the tree, in child arena order.
    pub fn bones(&self) -> impl Iterator<Item = &Bone> + '_ {
        self.joints.iter().filter_map(|joint| joint.bone.as_ref())
    }

    /// Change the thickness of the bone ending at `joint`.
    ///
    /// Returns `false` when the joint has no incoming bone (the root).
    pub fn set_bone_thickness(
        &mut self,
        joint: JointId,
        thickness: f32,
    ) -> Result<bool, TopologyError> {
        match self.get_mut(joint)?.bone.as_mut() {
            Some(bone) => {
                bone.set_thickness(thickness);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Compose `rotation` into the joint's local rotation and refresh the
    /// cached absolute positions of its descendants.
    ///
    /// The rotated joint's own origin does not move; relative translations
    /// never change.
    pub fn apply_rotation(
        &mut self,
        joint: JointId,
        rotation: UnitQuaternion<f32>,
    ) -> Result<(), TopologyError> {
        {
            let j = self.get_mut(joint)?;
            j.relative_rotation = j.relative_rotation * rotation;
        }
        self.refresh_descendants(joint)
    }

    fn refresh_descendants(&mut self, joint: JointId) -> Result<(), TopologyError> {
        let children: Vec<JointId> = self.get(joint)?.children().collect();
        for child in children {
            self.recompute_absolute(child)?;
        }
        Ok(())
    }

    /// Rebuild one joint's absolute translation by accumulating the relative
    /// frames of every ancestor up to the root, then recurse into children.
    /// Never called for the root; its absolute position is authoritative.
    fn recompute_absolute(&mut self, joint: JointId) -> Result<(), TopologyError> {
        let mut vector = *self.get(joint)?.relative_translation();
        let mut current = joint;
        while let Some(parent) = self.get(current)?.parent() {
            let p = &self.joints[parent.index()];
            vector = p.relative_rotation * vector + p.relative_translation;
            if p.is_root() {
                vector += p.absolute_translation;
                break;
            }
            current = parent;
        }
        self.joints[joint.index()].absolute_translation = vector;

        let children: Vec<JointId> = self.joints[joint.index()].children.clone();
        for child in children {
            self.recompute_absolute(child)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_eq(actual: &Vector3<f32>, expected: &Vector3<f32>) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(actual.z, expected.z, epsilon = 1e-5);
    }

    /// Straight chain along +X: root at (-4,0,0), then unit links.
    fn unit_chain(links: usize) -> (JointTree, Vec<JointId>) {
        let mut tree = JointTree::new("Root", Vector3::new(-4.0, 0.0, 0.0));
        let mut ids = vec![tree.root()];
        for i in 1..=links {
            let position = Vector3::new(-4.0 + i as f32, 0.0, 0.0);
            let id = tree
                .add_child(
                    format!("J{i}"),
                    *ids.last().unwrap(),
                    position,
                    BoneVariant::Cylinder,
                )
                .unwrap();
            ids.push(id);
        }
        (tree, ids)
    }

    /// Recompute every absolute position from scratch with a top-down walk
    /// over accumulated parent frames.
    fn scratch_positions(tree: &JointTree) -> Vec<Vector3<f32>> {
        let mut positions = vec![Vector3::zeros(); tree.len()];
        let mut rotations = vec![UnitQuaternion::identity(); tree.len()];
        for (id, joint) in tree.iter() {
            match joint.parent() {
                None => {
                    positions[id.index()] = *joint.absolute_translation();
                    rotations[id.index()] = *joint.relative_rotation();
                }
                Some(parent) => {
                    positions[id.index()] = positions[parent.index()]
                        + rotations[parent.index()] * *joint.relative_translation();
                    rotations[id.index()] =
                        rotations[parent.index()] * *joint.relative_rotation();
                }
            }
        }
        positions
    }

    #[test]
    fn root_defaults() {
        let tree = JointTree::new("Root", Vector3::new(1.0, 2.0, 3.0));
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.name(), "Root");
        assert!(root.is_root());
        assert!(root.bone().is_none());
        assert_vec_eq(root.absolute_translation(), &Vector3::new(1.0, 2.0, 3.0));
        assert_vec_eq(root.relative_translation(), &Vector3::zeros());
        assert!(
            (root.marker().radius() - JointMarker::ROOT_RADIUS).abs() < f32::EPSILON
        );
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
    }

    #[test]
    fn add_child_derives_relative_translation() {
        let mut tree = JointTree::new("Root", Vector3::new(-4.0, 0.0, 0.0));
        let child = tree
            .add_child(
                "J1",
                tree.root(),
                Vector3::new(-2.0, 0.0, 0.0),
                BoneVariant::Ellipsoid,
            )
            .unwrap();

        let joint = tree.get(child).unwrap();
        assert_vec_eq(joint.relative_translation(), &Vector3::new(2.0, 0.0, 0.0));
        assert_vec_eq(joint.absolute_translation(), &Vector3::new(-2.0, 0.0, 0.0));
        assert_eq!(joint.parent(), Some(tree.root()));

        let bone = joint.bone().unwrap();
        assert_eq!(bone.variant(), BoneVariant::Ellipsoid);
        assert_eq!(bone.parent(), tree.root());
        assert_eq!(bone.child(), child);

        let children: Vec<_> = tree.children(tree.root()).unwrap().collect();
        assert_eq!(children, vec![child]);
    }

    #[test]
    fn add_child_rejects_duplicate_name() {
        let mut tree = JointTree::new("Root", Vector3::zeros());
        tree.add_child("Arm", tree.root(), Vector3::new(1.0, 0.0, 0.0), BoneVariant::Cylinder)
            .unwrap();
        let err = tree
            .add_child("Arm", tree.root(), Vector3::new(2.0, 0.0, 0.0), BoneVariant::Cylinder)
            .unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateName(name) if name == "Arm"));
    }

    #[test]
    fn add_child_rejects_unknown_parent() {
        let mut tree = JointTree::new("Root", Vector3::zeros());
        let err = tree
            .add_child(
                "J1",
                JointId::new(99),
                Vector3::new(1.0, 0.0, 0.0),
                BoneVariant::Cone,
            )
            .unwrap_err();
        assert!(matches!(err, TopologyError::UnknownJoint(id) if id == JointId::new(99)));
    }

    #[test]
    fn joint_by_name_lookup() {
        let (tree, ids) = unit_chain(3);
        assert_eq!(tree.joint_by_name("Root"), Some(ids[0]));
        assert_eq!(tree.joint_by_name("J2"), Some(ids[2]));
        assert_eq!(tree.joint_by_name("Elbow"), None);
    }

    #[test]
    fn identity_rotation_keeps_positions() {
        let (mut tree, ids) = unit_chain(2);
        tree.apply_rotation(ids[0], UnitQuaternion::identity()).unwrap();
        assert_vec_eq(
            &tree.position(ids[2]).unwrap(),
            &Vector3::new(-2.0, 0.0, 0.0),
        );
    }

    #[test]
    fn quarter_turn_at_root_swings_chain_up() {
        let (mut tree, ids) = unit_chain(2);
        let quarter = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        tree.apply_rotation(ids[0], quarter).unwrap();

        // Root origin itself never moves.
        assert_vec_eq(
            &tree.position(ids[0]).unwrap(),
            &Vector3::new(-4.0, 0.0, 0.0),
        );
        assert_vec_eq(
            &tree.position(ids[1]).unwrap(),
            &Vector3::new(-4.0, 1.0, 0.0),
        );
        assert_vec_eq(
            &tree.position(ids[2]).unwrap(),
            &Vector3::new(-4.0, 2.0, 0.0),
        );
    }

    #[test]
    fn rotations_compose_multiplicatively() {
        let (mut tree, ids) = unit_chain(2);
        let eighth = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2 / 2.0);
        tree.apply_rotation(ids[0], eighth).unwrap();
        tree.apply_rotation(ids[0], eighth).unwrap();

        assert_vec_eq(
            &tree.position(ids[2]).unwrap(),
            &Vector3::new(-4.0, 2.0, 0.0),
        );
    }

    #[test]
    fn sequential_rotations_match_composed_product() {
        let r1 = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.4);
        let r2 = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.9);

        let (mut stepped, ids) = unit_chain(3);
        stepped.apply_rotation(ids[1], r1).unwrap();
        stepped.apply_rotation(ids[1], r2).unwrap();

        let (mut composed, _) = unit_chain(3);
        composed.apply_rotation(ids[1], r1 * r2).unwrap();

        for id in stepped.ids() {
            assert_vec_eq(
                &stepped.position(id).unwrap(),
                &composed.position(id).unwrap(),
            );
        }
    }

    #[test]
    fn rotation_moves_only_the_subtree() {
        let (mut tree, ids) = unit_chain(3);
        let quarter = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        tree.apply_rotation(ids[2], quarter).unwrap();

        // Ancestors and the rotated joint itself stay put.
        assert_vec_eq(
            &tree.position(ids[0]).unwrap(),
            &Vector3::new(-4.0, 0.0, 0.0),
        );
        assert_vec_eq(
            &tree.position(ids[1]).unwrap(),
            &Vector3::new(-3.0, 0.0, 0.0),
        );
        assert_vec_eq(
            &tree.position(ids[2]).unwrap(),
            &Vector3::new(-2.0, 0.0, 0.0),
        );
        // The child swings upward around it.
        assert_vec_eq(
            &tree.position(ids[3]).unwrap(),
            &Vector3::new(-2.0, 1.0, 0.0),
        );
    }

    #[test]
    fn rotating_a_leaf_moves_nothing() {
        let (mut tree, ids) = unit_chain(2);
        let before = scratch_positions(&tree);
        let quarter = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        tree.apply_rotation(ids[2], quarter).unwrap();
        for id in tree.ids() {
            assert_vec_eq(&tree.position(id).unwrap(), &before[id.index()]);
        }
    }

    #[test]
    fn relative_translations_survive_rotation() {
        let (mut tree, ids) = unit_chain(3);
        let quarter = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        tree.apply_rotation(ids[1], quarter).unwrap();
        for id in tree.ids() {
            let joint = tree.get(id).unwrap();
            if joint.is_root() {
                assert_vec_eq(joint.relative_translation(), &Vector3::zeros());
            } else {
                assert_vec_eq(joint.relative_translation(), &Vector3::new(1.0, 0.0, 0.0));
            }
        }
    }

    #[test]
    fn branching_subtrees_refresh_together() {
        let mut tree = JointTree::new("Root", Vector3::zeros());
        let hip = tree
            .add_child("Hip", tree.root(), Vector3::new(0.0, 1.0, 0.0), BoneVariant::Cylinder)
            .unwrap();
        let left = tree
            .add_child("Left", hip, Vector3::new(-1.0, 1.0, 0.0), BoneVariant::Cylinder)
            .unwrap();
        let right = tree
            .add_child("Right", hip, Vector3::new(1.0, 1.0, 0.0), BoneVariant::Cylinder)
            .unwrap();

        let half = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::PI);
        tree.apply_rotation(hip, half).unwrap();

        assert_vec_eq(&tree.position(hip).unwrap(), &Vector3::new(0.0, 1.0, 0.0));
        assert_vec_eq(&tree.position(left).unwrap(), &Vector3::new(1.0, 1.0, 0.0));
        assert_vec_eq(&tree.position(right).unwrap(), &Vector3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn cached_absolutes_match_scratch_walk() {
        let (mut tree, ids) = unit_chain(4);
        let angles = [0.3_f32, -0.7, 1.1];
        for (joint, angle) in ids.iter().zip(angles) {
            let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle);
            tree.apply_rotation(*joint, rotation).unwrap();
        }

        let expected = scratch_positions(&tree);
        for id in tree.ids() {
            assert_vec_eq(&tree.position(id).unwrap(), &expected[id.index()]);
        }
    }

    #[test]
    fn set_bone_thickness_skips_root() {
        let (mut tree, ids) = unit_chain(2);
        assert!(!tree.set_bone_thickness(ids[0], 0.4).unwrap());
        assert!(tree.set_bone_thickness(ids[1], 0.4).unwrap());
        let bone = tree.get(ids[1]).unwrap().bone().unwrap();
        assert!((bone.thickness() - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn bones_cover_every_non_root_joint() {
        let (tree, _) = unit_chain(3);
        let bones: Vec<_> = tree.bones().collect();
        assert_eq!(bones.len(), 3);
        for bone in bones {
            assert_ne!(bone.child(), tree.root());
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn tree_is_send_sync() {
        assert_send_sync::<JointTree>();
        assert_send_sync::<Joint>();
    }
}
