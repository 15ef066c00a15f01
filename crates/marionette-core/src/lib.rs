// marionette-core: Shared ids, numeric tolerance, config, errors for the
// marionette skeletal kinematics workspace.

pub mod config;
pub mod error;
pub mod types;
