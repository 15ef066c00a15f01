//! Hierarchical joint tree with forward kinematics and procedural bone
//! geometry for the marionette workspace.
//!
//! Provides the arena-backed [`JointTree`] (relative/absolute transform
//! bookkeeping, rotation propagation), per-bone render geometry derivation,
//! and the built-in chain and spider topologies.

pub mod bone;
pub mod error;
pub mod geometry;
pub mod math;
pub mod topology;
pub mod tree;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use bone::{Bone, BoneVariant, JointMarker};
pub use error::{GeometryError, TopologyError};
pub use geometry::{bone_shape, BoneShape};
pub use math::rotation_between;
pub use topology::{build_topology, chain_with_lengths, spider, Topology, TopologySpec};
pub use tree::{Joint, JointTree};
