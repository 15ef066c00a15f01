use marionette_core::config::RigConfig;
use marionette_core::types::JointId;
use nalgebra::Vector3;
use rand::Rng;

use crate::bone::BoneVariant;
use crate::error::TopologyError;
use crate::tree::JointTree;

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// A built joint tree plus the chain metadata the solver needs.
#[derive(Debug, Clone)]
pub struct Topology {
    pub tree: JointTree,
    /// Joint driven by the inverse solver. `None` for topologies without a
    /// distinguished end, which stay in forward mode.
    pub end_effector: Option<JointId>,
    /// Sum of link lengths from root to end effector. Targets beyond this
    /// reach get clamped onto it.
    pub total_length: f32,
}

/// Built-in topology selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologySpec {
    /// Straight chain of `links` bones along +X with randomized lengths.
    Chain { links: u32 },
    /// Four body segments with two three-joint legs each.
    Spider,
}

/// Build a topology from config, drawing link lengths from `rng`.
pub fn build_topology(
    spec: TopologySpec,
    config: &RigConfig,
    rng: &mut impl Rng,
) -> Result<Topology, TopologyError> {
    match spec {
        TopologySpec::Chain { links } => {
            if links < 2 {
                return Err(TopologyError::ChainTooShort(links));
            }
            let [min, max] = config.link_length;
            let lengths: Vec<f32> = (0..links).map(|_| rng.gen_range(min..=max)).collect();
            chain_with_lengths(
                &lengths,
                Vector3::from(config.root_position),
                config.bone_thickness,
            )
        }
        TopologySpec::Spider => spider(config.bone_thickness),
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Build a straight chain along +X with the given link lengths.
///
/// Joints are named `J1..Jn`. The last bone is a cone pointing at the end
/// effector; the rest alternate cylinder and ellipsoid.
pub fn chain_with_lengths(
    lengths: &[f32],
    root_position: Vector3<f32>,
    thickness: f32,
) -> Result<Topology, TopologyError> {
    let links = lengths.len() as u32;
    if links < 2 {
        return Err(TopologyError::ChainTooShort(links));
    }

    let mut tree = JointTree::new("Root", root_position);
    let mut parent = tree.root();
    let mut position = root_position;
    let mut total_length = 0.0;

    for (i, &length) in lengths.iter().enumerate() {
        let index = i as u32 + 1;
        let variant = if index == links {
            BoneVariant::Cone
        } else if index % 2 == 1 {
            BoneVariant::Cylinder
        } else {
            BoneVariant::Ellipsoid
        };
        position += Vector3::new(length, 0.0, 0.0);
        let child = tree.add_child(format!("J{index}"), parent, position, variant)?;
        tree.set_bone_thickness(child, thickness)?;
        total_length += length;
        parent = child;
    }

    Ok(Topology {
        tree,
        end_effector: Some(parent),
        total_length,
    })
}

// ---------------------------------------------------------------------------
// Spider
// ---------------------------------------------------------------------------

fn leg_offsets(sign: f32) -> [Vector3<f32>; 3] {
    [
        Vector3::new(sign * 1.0, 1.0, 0.0),
        Vector3::new(sign * 2.0, 0.0, 0.0),
        Vector3::new(sign * 1.5, -1.0, 0.0),
    ]
}

/// Three chained leg joints hanging off one body segment. Every offset is
/// taken from the body anchor, not the previous leg joint.
fn add_leg(
    tree: &mut JointTree,
    body: JointId,
    prefix: char,
    index: usize,
    offsets: &[Vector3<f32>; 3],
    thickness: f32,
) -> Result<(), TopologyError> {
    let anchor = tree.position(body)?;
    let mut parent = body;
    for (segment, offset) in offsets.iter().enumerate() {
        let variant = if segment == 2 {
            BoneVariant::Cone
        } else {
            BoneVariant::Cylinder
        };
        let joint = tree.add_child(
            format!("{prefix}{segment}{index}"),
            parent,
            anchor + offset,
            variant,
        )?;
        tree.set_bone_thickness(joint, thickness)?;
        parent = joint;
    }
    Ok(())
}

/// Build the spider: root at the origin, four ellipsoid body segments down
/// -Z, and mirrored legs on both sides of each segment.
///
/// The spider has no end effector, so it animates in forward mode only.
pub fn spider(thickness: f32) -> Result<Topology, TopologyError> {
    let mut tree = JointTree::new("Root", Vector3::zeros());

    let mut bodies = [tree.root(); 4];
    let mut parent = tree.root();
    for segment in 1..=4usize {
        let position = Vector3::new(0.0, 0.0, -(segment as f32));
        parent = tree.add_child(
            format!("Body{segment}"),
            parent,
            position,
            BoneVariant::Ellipsoid,
        )?;
        tree.set_bone_thickness(parent, thickness)?;
        bodies[segment - 1] = parent;
    }

    for (index, body) in bodies.into_iter().enumerate() {
        add_leg(&mut tree, body, 'n', index, &leg_offsets(-1.0), thickness)?;
        add_leg(&mut tree, body, 'p', index, &leg_offsets(1.0), thickness)?;
    }

    Ok(Topology {
        tree,
        end_effector: None,
        total_length: 0.0,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
