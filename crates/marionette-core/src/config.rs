use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_damping() -> f32 {
    0.05
}
const fn default_bone_thickness() -> f32 {
    0.1
}
const fn default_chain_links() -> u32 {
    10
}
const fn default_link_length() -> [f32; 2] {
    [0.5, 2.0]
}
const fn default_root_position() -> [f32; 3] {
    [-4.0, 0.0, 0.0]
}

// ---------------------------------------------------------------------------
// RigConfig
// ---------------------------------------------------------------------------

/// Rig construction and solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    /// Damping constant added to the diagonal of the IK normal equations
    /// (default: 0.05). Keeps the solve invertible near singular poses.
    #[serde(default = "default_damping")]
    pub damping: f32,

    /// Default bone thickness (default: 0.1). Lateral radius of generated
    /// bone primitives; independent of bone length.
    #[serde(default = "default_bone_thickness")]
    pub bone_thickness: f32,

    /// Link count for generated chains (default: 10). Must be >= 2.
    #[serde(default = "default_chain_links")]
    pub chain_links: u32,

    /// Uniform sampling range [min, max] for generated link lengths
    /// (default: [0.5, 2.0]).
    #[serde(default = "default_link_length")]
    pub link_length: [f32; 2],

    /// World position of a generated chain's root joint
    /// (default: [-4, 0, 0]).
    #[serde(default = "default_root_position")]
    pub root_position: [f32; 3],

    /// Master random seed for link length draws.
    #[serde(default)]
    pub seed: u64,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            bone_thickness: default_bone_thickness(),
            chain_links: default_chain_links(),
            link_length: default_link_length(),
            root_position: default_root_position(),
            seed: 0,
        }
    }
}

impl RigConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.damping <= 0.0 {
            return Err(ConfigError::InvalidDamping(self.damping));
        }
        if self.bone_thickness <= 0.0 {
            return Err(ConfigError::InvalidThickness(self.bone_thickness));
        }
        if self.chain_links < 2 {
            return Err(ConfigError::TooFewLinks(self.chain_links));
        }
        let [min, max] = self.link_length;
        if min <= 0.0 || min > max {
            return Err(ConfigError::InvalidLinkLength { min, max });
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
