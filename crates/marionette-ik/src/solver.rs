//! Damped least squares solve.
//!
//! One step linearizes the chain at its current pose, solves the damped
//! normal equations for per-joint rotation angles, and applies them through
//! the forward kinematics of the tree.

use marionette_core::types::TOLERANCE;
use marionette_skeleton::JointTree;
use nalgebra::{DMatrix, DVector, UnitQuaternion, Vector3};

use crate::chain::IkChain;
use crate::error::SolveError;

/// Outcome of one applied solver step.
#[derive(Debug, Clone)]
pub struct SolveStep {
    /// Target actually aimed for, clamped onto the chain's reach sphere
    /// when the requested point lies beyond it.
    pub target: Vector3<f32>,
    /// Rotation angles applied per ancestor, immediate parent first.
    pub angles: Vec<f32>,
    /// Effector distance to the clamped target before the step.
    pub error_before: f32,
    /// Effector distance to the clamped target after the step.
    pub error_after: f32,
}

/// Damped least squares solver for one rotation axis per joint.
///
/// Every driven joint rotates about its local Z axis. The damping constant
/// is added to the diagonal of the normal equations, which keeps the solve
/// well conditioned near singular poses at the cost of slightly slower
/// convergence.
#[derive(Debug, Clone)]
pub struct DlsSolver {
    damping: f32,
}

impl DlsSolver {
    pub const DEFAULT_DAMPING: f32 = 0.05;

    pub const fn new(damping: f32) -> Self {
        Self { damping }
    }

    pub const fn with_defaults() -> Self {
        Self::new(Self::DEFAULT_DAMPING)
    }

    pub const fn damping(&self) -> f32 {
        self.damping
    }

    /// Perform one damped step toward `target` and apply the resulting
    /// rotations to the tree.
    ///
    /// `total_length` is the chain's reach from the root; targets farther
    /// away are pulled back onto that sphere before solving. On any error
    /// the tree is left untouched.
    pub fn step(
        &self,
        tree: &mut JointTree,
        chain: &IkChain,
        target: Vector3<f32>,
        total_length: f32,
    ) -> Result<SolveStep, SolveError> {
        let effector_position = tree.position(chain.effector())?;
        let root_position = tree.position(chain.root())?;

        let offset = target - root_position;
        let target_distance = offset.norm();
        if target_distance < TOLERANCE {
            return Err(SolveError::DegenerateTarget);
        }
        let target = if target_distance > total_length {
            root_position + offset * (total_length / target_distance)
        } else {
            target
        };

        // Jacobian column per ancestor: instantaneous effector velocity for
        // a unit angular change about that joint's Z axis.
        let dof = chain.dof();
        let axis = Vector3::z();
        let mut jacobian = DMatrix::zeros(3, dof);
        for (i, &ancestor) in chain.ancestors().iter().enumerate() {
            let origin = tree.position(ancestor)?;
            let column = axis.cross(&(effector_position - origin));
            jacobian[(0, i)] = column.x;
            jacobian[(1, i)] = column.y;
            jacobian[(2, i)] = column.z;
        }

        let transpose = jacobian.transpose();
        let normal = &transpose * &jacobian + DMatrix::identity(dof, dof) * self.damping;
        let Some(inverse) = normal.try_inverse() else {
            return Err(SolveError::SingularSolve);
        };

        let error = target - effector_position;
        let error_before = error.norm();
        let rhs = DVector::from_column_slice(&[error.x, error.y, error.z]);
        let delta = inverse * transpose * rhs;

        for (i, &ancestor) in chain.ancestors().iter().enumerate() {
            let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), delta[i]);
            tree.apply_rotation(ancestor, rotation)?;
        }

        let error_after = (target - tree.position(chain.effector())?).norm();

        Ok(SolveStep {
            target,
            angles: delta.iter().copied().collect(),
            error_before,
            error_after,
        })
    }
}

impl Default for DlsSolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use marionette_skeleton::BoneVariant;
    use marionette_test_utils::unit_chain;
    use nalgebra::Vector3;

    #[test]
    fn one_step_reduces_error() {
        let mut topology = unit_chain(2);
        let effector = topology.end_effector.unwrap();
        let chain = IkChain::from_tree(&topology.tree, effector).unwrap();
        let solver = DlsSolver::with_defaults();

        let target = Vector3::new(-4.0, 1.5, 0.0);
        let step = solver
            .step(&mut topology.tree, &chain, target, topology.total_length)
            .unwrap();

        assert_relative_eq!(step.error_before, 2.5, epsilon = 1e-5);
        assert!(step.error_after < step.error_before);
        assert!(step.error_after > 1.4 && step.error_after < 1.5);

        // Angles from the damped normal equations at the straight pose.
        assert_eq!(step.angles.len(), 2);
        assert_relative_eq!(step.angles[0], 0.075 / 0.2525, epsilon = 1e-4);
        assert_relative_eq!(step.angles[1], 0.15 / 0.2525, epsilon = 1e-4);
    }

    #[test]
    fn repeated_steps_converge_on_reachable_target() {
        let mut topology = unit_chain(2);
        let effector = topology.end_effector.unwrap();
        let chain = IkChain::from_tree(&topology.tree, effector).unwrap();
        let solver = DlsSolver::with_defaults();

        let target = Vector3::new(-4.0, 1.5, 0.0);
        let mut last_error = f32::INFINITY;
        for _ in 0..100 {
            let step = solver
                .step(&mut topology.tree, &chain, target, topology.total_length)
                .unwrap();
            assert!(step.error_after <= last_error + 1e-6);
            last_error = step.error_after;
        }
        assert!(last_error < 1e-2);

        let effector_position = topology.tree.position(effector).unwrap();
        assert_relative_eq!(effector_position.x, -4.0, epsilon = 1e-2);
        assert_relative_eq!(effector_position.y, 1.5, epsilon = 1e-2);
    }

    #[test]
    fn unreachable_target_clamps_to_reach_sphere() {
        let mut topology = unit_chain(2);
        let effector = topology.end_effector.unwrap();
        let chain = IkChain::from_tree(&topology.tree, effector).unwrap();
        let solver = DlsSolver::with_defaults();

        let step = solver
            .step(
                &mut topology.tree,
                &chain,
                Vector3::new(-4.0, 10.0, 0.0),
                topology.total_length,
            )
            .unwrap();

        // Ten units up from the root, pulled back to reach 2.
        assert_relative_eq!(step.target.x, -4.0, epsilon = 1e-5);
        assert_relative_eq!(step.target.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(step.target.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_target_leaves_pose_untouched() {
        let mut topology = unit_chain(2);
        let effector = topology.end_effector.unwrap();
        let chain = IkChain::from_tree(&topology.tree, effector).unwrap();
        let solver = DlsSolver::with_defaults();

        let before: Vec<_> = topology
            .tree
            .ids()
            .map(|id| topology.tree.position(id).unwrap())
            .collect();

        // Target exactly on the root.
        let err = solver
            .step(
                &mut topology.tree,
                &chain,
                Vector3::new(-4.0, 0.0, 0.0),
                topology.total_length,
            )
            .unwrap_err();
        assert!(matches!(err, SolveError::DegenerateTarget));

        for (id, expected) in topology.tree.ids().zip(before) {
            let position = topology.tree.position(id).unwrap();
            assert_relative_eq!(position.x, expected.x, epsilon = 1e-6);
            assert_relative_eq!(position.y, expected.y, epsilon = 1e-6);
            assert_relative_eq!(position.z, expected.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn undamped_singular_pose_reports_without_mutating() {
        // A fully extended chain aimed along its own axis is singular once
        // the damping term is removed.
        let mut topology = unit_chain(2);
        let effector = topology.end_effector.unwrap();
        let chain = IkChain::from_tree(&topology.tree, effector).unwrap();
        let solver = DlsSolver::new(0.0);

        let before: Vec<_> = topology
            .tree
            .ids()
            .map(|id| topology.tree.position(id).unwrap())
            .collect();

        let err = solver
            .step(
                &mut topology.tree,
                &chain,
                Vector3::new(0.0, 0.0, 0.0),
                topology.total_length,
            )
            .unwrap_err();
        assert!(matches!(err, SolveError::SingularSolve));

        for (id, expected) in topology.tree.ids().zip(before) {
            let position = topology.tree.position(id).unwrap();
            assert_relative_eq!(position.x, expected.x, epsilon = 1e-6);
            assert_relative_eq!(position.y, expected.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn single_link_chain_degenerates_to_aiming() {
        let mut tree = JointTree::new("Root", Vector3::zeros());
        let tip = tree
            .add_child("Tip", tree.root(), Vector3::new(1.0, 0.0, 0.0), BoneVariant::Cone)
            .unwrap();
        let chain = IkChain::from_tree(&tree, tip).unwrap();
        assert_eq!(chain.dof(), 1);

        let solver = DlsSolver::with_defaults();
        let step = solver
            .step(&mut tree, &chain, Vector3::new(0.0, 1.0, 0.0), 1.0)
            .unwrap();

        // 3x1 Jacobian: (J^T J + damping)^-1 J^T e = 1 / 1.05.
        assert_relative_eq!(step.angles[0], 1.0 / 1.05, epsilon = 1e-4);
        assert!(step.error_after < step.error_before);
    }

    #[test]
    fn default_solver_uses_default_damping() {
        let solver = DlsSolver::default();
        assert_relative_eq!(solver.damping(), DlsSolver::DEFAULT_DAMPING);
    }
}
