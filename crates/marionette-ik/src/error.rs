use marionette_core::types::JointId;
use marionette_skeleton::TopologyError;
use thiserror::Error;

/// Errors from chain extraction and the damped solve.
///
/// A failed solve never mutates the tree; the pose is exactly what it was
/// before the call.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Joint {0} has no ancestors to drive")]
    NoChain(JointId),

    #[error("Target coincides with the chain root")]
    DegenerateTarget,

    #[error("Damped normal equations are singular")]
    SingularSolve,

    #[error(transparent)]
    Topology(#[from] TopologyError),
}
