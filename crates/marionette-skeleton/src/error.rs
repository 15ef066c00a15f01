use marionette_core::types::JointId;
use thiserror::Error;

/// Errors from joint tree construction and lookup.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Unknown joint: {0}")]
    UnknownJoint(JointId),

    #[error("Duplicate joint name: {0}")]
    DuplicateName(String),

    #[error("Chain too short: {0} links (need >= 2)")]
    ChainTooShort(u32),
}

/// Errors from bone geometry derivation.
#[derive(Debug, Clone, Copy, Error)]
pub enum GeometryError {
    #[error("Degenerate bone from {parent} to {child}: endpoints coincide")]
    DegenerateBone { parent: JointId, child: JointId },
}
