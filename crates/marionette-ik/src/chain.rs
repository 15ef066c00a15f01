//! Ancestor chain extraction.
//!
//! The solver treats every joint between the end effector and the root as a
//! one degree of freedom revolute joint. The chain records them in the order
//! the Jacobian columns are laid out: immediate parent first, root last.

use marionette_core::types::JointId;
use marionette_skeleton::JointTree;

use crate::error::SolveError;

/// Driven ancestors of one end effector.
///
/// Valid for the tree (and topology) it was extracted from; rebuild the
/// chain after any topology change.
#[derive(Debug, Clone)]
pub struct IkChain {
    effector: JointId,
    ancestors: Vec<JointId>,
}

impl IkChain {
    /// Walk the parent links from `effector` up to the root.
    ///
    /// Fails with [`SolveError::NoChain`] when the effector is the root
    /// itself, since there is no joint left to drive.
    pub fn from_tree(tree: &JointTree, effector: JointId) -> Result<Self, SolveError> {
        let mut ancestors = Vec::new();
        let mut current = tree.get(effector)?.parent();
        while let Some(id) = current {
            ancestors.push(id);
            current = tree.get(id)?.parent();
        }
        if ancestors.is_empty() {
            return Err(SolveError::NoChain(effector));
        }
        Ok(Self {
            effector,
            ancestors,
        })
    }

    pub const fn effector(&self) -> JointId {
        self.effector
    }

    /// Driven joints, immediate parent first, root last.
    pub fn ancestors(&self) -> &[JointId] {
        &self.ancestors
    }

    /// Number of driven joints, which is the Jacobian column count.
    pub fn dof(&self) -> usize {
        self.ancestors.len()
    }

    /// The root joint. The ancestor list is never empty.
    pub fn root(&self) -> JointId {
        self.ancestors[self.ancestors.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
