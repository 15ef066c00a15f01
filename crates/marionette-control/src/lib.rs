//! Rig control for the marionette workspace.
//!
//! Owns one joint tree plus the interaction state around it: the forward or
//! inverse kinematics mode, the exclusive joint selection, and the dirty
//! flag that tells a geometry consumer when to pull a fresh [`Frame`].
//!
//! Rendering and input decoding stay outside; callers feed resolved
//! commands (selected ids, rotation planes with signed magnitudes, world
//! target points) and read back plain view structs.

pub mod command;
pub mod error;
pub mod frame;
pub mod rig;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use command::AxisPlane;
pub use error::RigError;
pub use frame::{BoneView, Frame, JointView};
pub use rig::{Mode, Rig};
