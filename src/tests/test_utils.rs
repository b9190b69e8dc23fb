//! Lightweight stand-ins for the arm, the collision world and the planner, so that
//! generator and evaluator behavior can be checked without the full cell.

use nalgebra::{Translation3, Vector3};
use crate::clearance::{MotionPlanner, PlannedPath};
use crate::collisions_traits::CollisionDetector;
use crate::error::SamplingError;
use crate::generator::grasp_pose;
use crate::kinematic_traits::{Configuration, Joints, Kinematics, Pose, Solutions};

/// "Arm" whose joints are the tip coordinates directly: (x, y, z, theta, 0, 0).
/// Poses farther than `reach` from the origin have no solution. `shift` is added to x by
/// inverse kinematics, so a non-zero shift makes solutions miss the requested point.
pub(crate) struct PointArm {
    pub reach: f64,
    pub shift: f64,
}

impl PointArm {
    pub fn new(reach: f64) -> Self {
        PointArm { reach, shift: 0.0 }
    }
}

impl Kinematics for PointArm {
    fn inverse(&self, pose: &Pose) -> Solutions {
        self.inverse_continuing(pose, &[0.0; 6])
    }

    fn inverse_continuing(&self, pose: &Pose, _previous: &Joints) -> Solutions {
        let p = pose.translation.vector;
        if p.norm() > self.reach {
            return vec![];
        }
        let x_axis = pose.rotation * Vector3::x();
        let theta = x_axis.y.atan2(x_axis.x);
        vec![[p.x + self.shift, p.y, p.z, theta, 0.0, 0.0]]
    }

    fn forward(&self, qs: &Joints) -> Pose {
        grasp_pose(qs[0], qs[1], qs[2], qs[3])
    }

    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        let tip = self.forward(qs);
        let base = Pose::from_parts(Translation3::identity(), tip.rotation);
        [base, base, base, base, base, tip]
    }
}

/// Both arms are discs in the plane of their first two joints (x, y of the tip).
pub(crate) struct DiscDetector {
    pub radius: f64,
}

impl DiscDetector {
    fn gap(&self, active: &Configuration, companion: &Configuration) -> f64 {
        let dx = active[0] - companion[0];
        let dy = active[1] - companion[1];
        (dx * dx + dy * dy).sqrt() - 2.0 * self.radius
    }
}

impl CollisionDetector for DiscDetector {
    fn collides(&self, active: &Configuration, companion: &Configuration) -> bool {
        self.gap(active, companion) <= 0.0
    }

    fn clearance(&self, active: &Configuration, companion: &Configuration) -> f64 {
        self.gap(active, companion).max(0.0)
    }
}

/// Moves along the straight line, sampling clearance at both ends and in the middle.
pub(crate) struct StraightPlanner;

impl MotionPlanner for StraightPlanner {
    fn plan(&self, detector: &dyn CollisionDetector, start: &Configuration, goal: &Configuration,
            companion: &Configuration) -> Result<PlannedPath, SamplingError> {
        let middle: Configuration = std::array::from_fn(|i| (start[i] + goal[i]) / 2.0);
        let waypoints = vec![*start, middle, *goal];
        let clearances = waypoints.iter().map(|w| detector.clearance(w, companion)).collect();
        Ok(PlannedPath { waypoints, clearances })
    }
}

/// Never finds a path.
pub(crate) struct FailingPlanner;

impl MotionPlanner for FailingPlanner {
    fn plan(&self, _detector: &dyn CollisionDetector, _start: &Configuration, _goal: &Configuration,
            _companion: &Configuration) -> Result<PlannedPath, SamplingError> {
        Err(SamplingError::PlannerFailed("failed".to_string()))
    }
}

/// Companion "configuration" that places the companion disc at (x, y).
pub(crate) fn companion_at(x: f64, y: f64) -> Configuration {
    [x, y, 0.0, 0.0, 0.0, 0.0, 0.0]
}
