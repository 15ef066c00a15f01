use marionette_core::error::ConfigError;
use marionette_ik::SolveError;
use marionette_skeleton::{GeometryError, TopologyError};
use thiserror::Error;

/// Any error a rig operation can surface.
///
/// Topology and geometry problems are recoverable per joint or bone; solve
/// errors abort one solve call without changing the pose.
#[derive(Debug, Error)]
pub enum RigError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}
