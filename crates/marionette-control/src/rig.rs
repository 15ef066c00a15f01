use marionette_core::config::RigConfig;
use marionette_core::types::JointId;
use marionette_ik::{DlsSolver, IkChain, SolveStep};
use marionette_skeleton::{bone_shape, build_topology, JointTree, Topology, TopologySpec};
use nalgebra::{UnitQuaternion, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::command::AxisPlane;
use crate::error::RigError;
use crate::frame::{BoneView, Frame, JointView};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Interaction mode of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rotation commands drive the selected joint directly.
    Forward,
    /// Target commands drive the end effector through the solver.
    Inverse,
}

// ---------------------------------------------------------------------------
// Rig
// ---------------------------------------------------------------------------

/// One posable skeleton with its interaction state.
///
/// Owns the joint tree, the solver chain for the current topology, the
/// exclusive selection, and the dirty flag consumers poll to decide whether
/// to pull a fresh [`Frame`]. All commands are serialized through `&mut
/// self`; there is no interior mutability.
#[derive(Debug)]
pub struct Rig {
    config: RigConfig,
    topology: Topology,
    chain: Option<IkChain>,
    solver: DlsSolver,
    mode: Mode,
    selected: Option<JointId>,
    dirty: bool,
    rng: ChaCha8Rng,
}

impl Rig {
    /// Build a rig with a randomized chain of `config.chain_links` links.
    pub fn new(config: RigConfig) -> Result<Self, RigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let links = config.chain_links;
        let topology = build_topology(TopologySpec::Chain { links }, &config, &mut rng)?;
        Self::with_rng(config, topology, rng)
    }

    /// Build a rig with the spider topology. Spiders have no end effector
    /// and stay in forward mode.
    pub fn spider(config: RigConfig) -> Result<Self, RigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let topology = build_topology(TopologySpec::Spider, &config, &mut rng)?;
        Self::with_rng(config, topology, rng)
    }

    /// Build a rig around an externally constructed topology.
    pub fn from_topology(config: RigConfig, topology: Topology) -> Result<Self, RigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, topology, rng)
    }

    fn with_rng(
        config: RigConfig,
        topology: Topology,
        rng: ChaCha8Rng,
    ) -> Result<Self, RigError> {
        let chain = match topology.end_effector {
            Some(effector) => Some(IkChain::from_tree(&topology.tree, effector)?),
            None => None,
        };
        let solver = DlsSolver::new(config.damping);
        info!(
            "Built topology: {} joints, reach {:.3}",
            topology.tree.len(),
            topology.total_length
        );
        Ok(Self {
            config,
            topology,
            chain,
            solver,
            mode: Mode::Forward,
            selected: None,
            dirty: true,
            rng,
        })
    }

    // -----------------------------------------------------------------------
    // State access
    // -----------------------------------------------------------------------

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn selected(&self) -> Option<JointId> {
        self.selected
    }

    pub fn tree(&self) -> &JointTree {
        &self.topology.tree
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub const fn end_effector(&self) -> Option<JointId> {
        self.topology.end_effector
    }

    pub const fn total_length(&self) -> f32 {
        self.topology.total_length
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    /// Switch between forward and inverse mode.
    ///
    /// Entering inverse mode requires a solvable chain; without one the
    /// request is ignored and the rig stays in forward mode. Returns the
    /// mode in effect afterwards.
    pub fn toggle_mode(&mut self) -> Mode {
        let next = match self.mode {
            Mode::Forward => Mode::Inverse,
            Mode::Inverse => Mode::Forward,
        };
        self.set_mode(next)
    }

    /// Request a specific mode, with the same inverse-mode guard as
    /// [`Rig::toggle_mode`].
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        if mode == Mode::Inverse && !self.can_enter_inverse() {
            warn!("Ignoring inverse mode request: no solvable end effector chain");
            return self.mode;
        }
        if mode != self.mode {
            debug!("Mode: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.mode
    }

    fn can_enter_inverse(&self) -> bool {
        self.chain.is_some() && self.topology.total_length > 0.0
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select a joint for forward rotation, replacing any previous
    /// selection. Selection events are ignored in inverse mode.
    pub fn select(&mut self, joint: JointId) -> Result<bool, RigError> {
        if self.mode != Mode::Forward {
            return Ok(false);
        }
        self.topology.tree.get(joint)?;
        self.selected = Some(joint);
        debug!("Selected joint {}", joint);
        Ok(true)
    }

    /// Clear the selection. Ignored in inverse mode; returns whether a
    /// selection was cleared.
    pub fn deselect(&mut self) -> bool {
        if self.mode != Mode::Forward {
            return false;
        }
        match self.selected.take() {
            Some(joint) => {
                debug!("Deselected joint {}", joint);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Rotate the selected joint by `magnitude` radians in the given plane.
    ///
    /// Returns `Ok(false)` when the event does not apply: inverse mode, or
    /// nothing selected.
    pub fn rotate(&mut self, plane: AxisPlane, magnitude: f32) -> Result<bool, RigError> {
        if self.mode != Mode::Forward {
            return Ok(false);
        }
        let Some(joint) = self.selected else {
            return Ok(false);
        };
        let rotation = UnitQuaternion::from_axis_angle(&plane.axis(), magnitude);
        self.topology.tree.apply_rotation(joint, rotation)?;
        self.dirty = true;
        debug!("Rotated joint {} by {:.4} rad in {:?}", joint, magnitude, plane);
        Ok(true)
    }

    /// Run one solver step toward a world target and apply it.
    ///
    /// Returns `Ok(None)` when the event does not apply (forward mode).
    /// Solve errors leave the pose untouched.
    pub fn solve_toward(&mut self, target: Vector3<f32>) -> Result<Option<SolveStep>, RigError> {
        if self.mode != Mode::Inverse {
            return Ok(None);
        }
        let Some(chain) = self.chain.as_ref() else {
            return Ok(None);
        };
        let step = self.solver.step(
            &mut self.topology.tree,
            chain,
            target,
            self.topology.total_length,
        )?;
        self.dirty = true;
        debug!(
            "Solve step over {} joints: error {:.4} -> {:.4}",
            step.angles.len(),
            step.error_before,
            step.error_after
        );
        Ok(Some(step))
    }

    /// Change one bone's thickness. Returns `false` for the root, which has
    /// no incoming bone.
    pub fn set_bone_thickness(
        &mut self,
        joint: JointId,
        thickness: f32,
    ) -> Result<bool, RigError> {
        let changed = self.topology.tree.set_bone_thickness(joint, thickness)?;
        if changed {
            self.dirty = true;
        }
        Ok(changed)
    }

    // -----------------------------------------------------------------------
    // Topology rebuilds
    // -----------------------------------------------------------------------

    /// Replace the topology with a freshly randomized chain.
    ///
    /// On failure (fewer than two links) the current topology and state are
    /// preserved untouched.
    pub fn rebuild_chain(&mut self, links: u32) -> Result<(), RigError> {
        let topology =
            build_topology(TopologySpec::Chain { links }, &self.config, &mut self.rng)?;
        self.install(topology)
    }

    /// Replace the topology with the spider. Forces forward mode since the
    /// spider has no end effector.
    pub fn rebuild_spider(&mut self) -> Result<(), RigError> {
        let topology = build_topology(TopologySpec::Spider, &self.config, &mut self.rng)?;
        self.install(topology)
    }

    fn install(&mut self, topology: Topology) -> Result<(), RigError> {
        let chain = match topology.end_effector {
            Some(effector) => Some(IkChain::from_tree(&topology.tree, effector)?),
            None => None,
        };
        if chain.is_none() {
            self.mode = Mode::Forward;
        }
        self.chain = chain;
        self.topology = topology;
        self.selected = None;
        self.dirty = true;
        info!(
            "Installed topology: {} joints, reach {:.3}",
            self.topology.tree.len(),
            self.topology.total_length
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Frame extraction
    // -----------------------------------------------------------------------

    /// Walk the whole tree into a render snapshot and clear the dirty flag.
    ///
    /// Bones whose geometry cannot be derived are skipped and surfaced in
    /// [`Frame::warnings`]; the rest of the tree is still produced.
    pub fn frame(&mut self) -> Frame {
        let tree = &self.topology.tree;
        let mut joints = Vec::with_capacity(tree.len());
        let mut positions = Vec::with_capacity(tree.len());
        for (id, joint) in tree.iter() {
            let position = *joint.absolute_translation();
            positions.push(position);
            joints.push(JointView {
                id,
                name: joint.name().to_string(),
                position,
                is_root: joint.is_root(),
                marker_radius: joint.marker().radius(),
                selected: self.selected == Some(id),
            });
        }

        let mut bones = Vec::new();
        let mut warnings = Vec::new();
        for bone in tree.bones() {
            let parent_position = &positions[bone.parent().index()];
            let child_position = &positions[bone.child().index()];
            match bone_shape(bone, parent_position, child_position) {
                Ok(shape) => bones.push(BoneView {
                    parent: bone.parent(),
                    child: bone.child(),
                    shape,
                }),
                Err(err) => {
                    warn!("Skipping bone {} -> {}: {}", bone.parent(), bone.child(), err);
                    warnings.push(RigError::from(err));
                }
            }
        }

        self.dirty = false;
        Frame {
            mode: self.mode,
            joints,
            bones,
            warnings,
        }
    }

    /// Pull a frame only when something changed since the last pull.
    pub fn frame_if_changed(&mut self) -> Option<Frame> {
        if self.dirty {
            Some(self.frame())
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
