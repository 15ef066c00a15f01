//! Damped least squares inverse kinematics for marionette joint trees.
//!
//! Drives a single end-effector toward a world-space target by rotating
//! every ancestor joint about its local Z axis. One [`DlsSolver::step`] call
//! performs exactly one damped solve and applies it, so the caller decides
//! the cadence (typically once per input event).
//!
//! # Architecture
//!
//! ```text
//! JointTree ──► IkChain ──► DlsSolver::step ──► rotations applied back
//! ```
//!
//! The [`IkChain`] is extracted once per topology from the tree and lists
//! the effector's ancestors from its immediate parent up to the root.

pub mod chain;
pub mod error;
pub mod solver;

pub use chain::IkChain;
pub use error::SolveError;
pub use solver::{DlsSolver, SolveStep};
