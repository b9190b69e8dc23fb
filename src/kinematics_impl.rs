//! Forward kinematics over the Denavit-Hartenberg chain and numerical inverse kinematics
//! (damped least squares with deterministic restarts).

use std::f64::consts::PI;
use nalgebra::{Isometry3, Matrix6, Translation3, UnitQuaternion, Vector3, Vector6};
use rand::SeedableRng;
use rand::rngs::StdRng;
use crate::constraints::Constraints;
use crate::kinematic_traits::{Joints, Kinematics, Pose, Solutions};
use crate::parameters::dh_kinematics::Parameters;
use crate::utils::{dh_kinematics::is_valid, joint_distance, normalize_angle, poses_close};

/// Configuration of the iterative inverse kinematics solver.
#[derive(Debug, Clone, Copy)]
pub struct IkSettings {
    /// Maximal number of damped least squares iterations per start position.
    pub max_iterations: usize,

    /// Required precision of the tip position, meters.
    pub position_tolerance: f64,

    /// Required precision of the rotation, radians.
    pub orientation_tolerance: f64,

    /// Damping factor, keeps steps bounded near singularities.
    pub damping: f64,

    /// Maximal rotation of any joint per iteration, radians.
    pub max_step: f64,

    /// Number of additional random start positions tried after the initial guess.
    pub restarts: usize,

    /// Seed of the restart generator so that the same pose always yields the same solutions.
    pub restart_seed: u64,

    /// If false, search stops at the first converged solution.
    pub exhaustive: bool,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            position_tolerance: 1E-7,
            orientation_tolerance: 1E-7,
            damping: 0.01,
            max_step: 0.2,
            restarts: 12,
            restart_seed: 0x5eed,
            exhaustive: false,
        }
    }
}

/// Pose check after convergence, slightly looser than the solver tolerance.
const CHECK_TOLERANCE: f64 = 1E-5;

/// Two solutions closer than this (joint space, radians) are the same solution.
const SAME_SOLUTION: f64 = 1E-4;

/// Home position (upright UR posture) used when no previous position is known.
const HOME: Joints = [0.0, -PI / 2.0, PI / 2.0, -PI / 2.0, -PI / 2.0, 0.0];

#[derive(Debug, Clone)]
pub struct DhKinematics {
    parameters: Parameters,
    constraints: Option<Constraints>,
    settings: IkSettings,
}

impl DhKinematics {
    /// Creates a new `DhKinematics` instance with the given parameters.
    pub fn new(parameters: Parameters) -> Self {
        DhKinematics {
            parameters,
            constraints: None,
            settings: IkSettings::default(),
        }
    }

    /// Create a new instance that takes also Constraints.
    /// If constraints are set, all solutions returned by this solver are constraint compliant.
    pub fn new_with_constraints(parameters: Parameters, constraints: Constraints) -> Self {
        DhKinematics {
            parameters,
            constraints: Some(constraints),
            settings: IkSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: IkSettings) -> Self {
        self.settings = settings;
        self
    }

    fn link_transform(&self, link: usize, q: f64) -> Isometry3<f64> {
        let p = &self.parameters;
        let theta = q + p.offsets[link];
        Isometry3::from_parts(
            Translation3::new(0.0, 0.0, p.d[link]),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta),
        ) * Isometry3::from_parts(
            Translation3::new(p.a[link], 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), p.alpha[link]),
        )
    }

    fn frames(&self, qs: &Joints) -> [Pose; 6] {
        let mut current = Isometry3::identity();
        std::array::from_fn(|link| {
            current *= self.link_transform(link, qs[link]);
            current
        })
    }

    /// Pose error as (translation, rotation vector), both in the base frame.
    fn pose_error(current: &Pose, target: &Pose) -> Vector6<f64> {
        let dp = target.translation.vector - current.translation.vector;
        let dr = (target.rotation * current.rotation.inverse()).scaled_axis();
        Vector6::new(dp.x, dp.y, dp.z, dr.x, dr.y, dr.z)
    }

    /// Geometric Jacobian: column i is (z x (p_tip - o), z) of the axis of joint i.
    fn jacobian(&self, frames: &[Pose; 6]) -> Matrix6<f64> {
        let tip = frames[5].translation.vector;
        let mut jacobian = Matrix6::zeros();
        for joint in 0..6 {
            let (axis, origin) = if joint == 0 {
                (Vector3::z(), Vector3::zeros())
            } else {
                let frame = &frames[joint - 1];
                (frame.rotation * Vector3::z(), frame.translation.vector)
            };
            let linear = axis.cross(&(tip - origin));
            jacobian.fixed_view_mut::<3, 1>(0, joint).copy_from(&linear);
            jacobian.fixed_view_mut::<3, 1>(3, joint).copy_from(&axis);
        }
        jacobian
    }

    /// Damped least squares iterations from the given start. Returns normalized joints
    /// if converged.
    fn solve_from(&self, target: &Pose, start: &Joints) -> Option<Joints> {
        let s = &self.settings;
        let mut qs = *start;
        let damping = Matrix6::identity() * (s.damping * s.damping);
        for _ in 0..s.max_iterations {
            let frames = self.frames(&qs);
            let error = Self::pose_error(&frames[5], target);
            let position_error = error.fixed_rows::<3>(0).norm();
            let orientation_error = error.fixed_rows::<3>(3).norm();
            if position_error < s.position_tolerance && orientation_error < s.orientation_tolerance {
                let solution = qs.map(normalize_angle);
                return is_valid(&solution).then_some(solution);
            }

            let jacobian = self.jacobian(&frames);
            let y = (jacobian * jacobian.transpose() + damping).lu().solve(&error)?;
            let mut step = jacobian.transpose() * y;
            let largest = step.amax();
            if largest > s.max_step {
                step *= s.max_step / largest;
            }
            for (q, dq) in qs.iter_mut().zip(step.iter()) {
                *q += dq;
            }
        }
        None
    }

    fn acceptable(&self, target: &Pose, solution: &Joints) -> bool {
        if let Some(constraints) = &self.constraints {
            if !constraints.compliant(solution) {
                return false;
            }
        }
        // Cross-check with forward kinematics.
        poses_close(&self.forward(solution), target, CHECK_TOLERANCE, CHECK_TOLERANCE)
    }

    fn restart_positions(&self) -> Vec<Joints> {
        let mut rng = StdRng::seed_from_u64(self.settings.restart_seed);
        let constraints = self.constraints.clone().unwrap_or_else(Constraints::unconstrained);
        (0..self.settings.restarts)
            .map(|_| constraints.random_angles(&mut rng))
            .collect()
    }

    fn solve(&self, target: &Pose, previous: &Joints) -> Solutions {
        let mut solutions: Solutions = Vec::with_capacity(4);
        let starts = std::iter::once(*previous).chain(self.restart_positions());
        for start in starts {
            if let Some(solution) = self.solve_from(target, &start) {
                let known = solutions.iter()
                    .any(|s| joint_distance(s, &solution) < SAME_SOLUTION);
                if !known && self.acceptable(target, &solution) {
                    solutions.push(solution);
                    if !self.settings.exhaustive {
                        break;
                    }
                }
            }
        }
        solutions.sort_by(|a, b| {
            joint_distance(a, previous).total_cmp(&joint_distance(b, previous))
        });
        solutions
    }
}

impl Kinematics for DhKinematics {
    fn inverse(&self, pose: &Pose) -> Solutions {
        self.solve(pose, &HOME)
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &Joints) -> Solutions {
        self.solve(pose, previous)
    }

    fn forward(&self, qs: &Joints) -> Pose {
        self.frames(qs)[5]
    }

    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        self.frames(qs)
    }
}
