//! Provides tool and base for the arm.
//! Both Tool and Base take arbitrary implementation of Kinematics and are such
//! implementations themselves. Hence, they can be cascaded: the arm standing on its pedestal,
//! holding the gripper whose rigid tip is the control point:
//! ```
//! use std::sync::Arc;
//! use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
//! use dual_arm_sampling::kinematic_traits::{Joints, Kinematics, Pose};
//! use dual_arm_sampling::kinematics_impl::DhKinematics;
//! use dual_arm_sampling::parameters::dh_kinematics::Parameters;
//! let arm_alone = DhKinematics::new(Parameters::ur10());
//!
//! // Pedestal, arm rotated 90 degrees around the vertical axis
//! let base_transform = Isometry3::from_parts(
//!   Translation3::new(0.885, 0.012, 0.786),
//!   UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
//! );
//!
//! let arm_on_base = dual_arm_sampling::tool::Base {
//!   robot: Arc::new(arm_alone),
//!   base: base_transform,
//! };
//!
//! // Rigid tip 14 cm below the flange
//! let arm_with_tip = dual_arm_sampling::tool::Tool {
//!   robot: Arc::new(arm_on_base),
//!   tool: Isometry3::translation(0.0720, -0.0596, 0.1411),
//! };
//!
//! let joints: Joints = [0.0, -1.2, 1.5, -1.9, -1.57, 0.4];
//! let tip: Pose = arm_with_tip.forward(&joints);
//! println!("The gripper tip is at: {:?}", tip.translation);
//! ```

extern crate nalgebra as na;

use std::sync::Arc;
use na::Isometry3;
use crate::kinematic_traits::{Joints, Kinematics, Pose, Solutions};

/// Defines the fixed tool that can be attached to the flange (joint 6) of the arm.
/// The tool moves with the arm, providing additional translation and, if needed,
/// rotation. The tool itself fully implements the Kinematics,
/// providing both inverse and forward kinematics for the arm with a tool (with
/// "pose" being assumed as the position and rotation of the tool tip).
#[derive(Clone)]
pub struct Tool {
    pub robot: Arc<dyn Kinematics>,  // The arm

    /// Transformation from the arm flange to the tool tip.
    pub tool: Isometry3<f64>,
}

/// Defines the fixed base that holds the arm.
/// The base moves the arm to its installed location in the cell, providing also rotation
/// if required. Base itself fully implements the Kinematics,
/// providing both inverse and forward kinematics for the arm on a base.
#[derive(Clone)]
pub struct Base {
    pub robot: Arc<dyn Kinematics>,  // The arm

    /// Transformation from the world origin to the arm base.
    pub base: Isometry3<f64>,
}

impl Kinematics for Tool {
    fn inverse(&self, tcp: &Pose) -> Solutions {
        self.robot.inverse(&(tcp * self.tool.inverse()))
    }

    fn inverse_continuing(&self, tcp: &Pose, previous: &Joints) -> Solutions {
        self.robot.inverse_continuing(&(tcp * self.tool.inverse()), previous)
    }

    fn forward(&self, qs: &Joints) -> Pose {
        // Calculate the pose of the flange using the arm kinematics
        let flange = self.robot.forward(qs);
        flange * self.tool
    }

    /// Joint poses are not affected by the tool, the last one stays the flange.
    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6] {
        self.robot.forward_with_joint_poses(qs)
    }
}

impl Kinematics for Base {
    fn inverse(&self, tcp: &Pose) -> Solutions {
        self.robot.inverse(&(self.base.inverse() * tcp))
    }

    fn inverse_continuing(&self, tcp: &Pose, previous: &Joints) -> Solutions {
        self.robot.inverse_continuing(&(self.base.inverse() * tcp), previous)
    }

    fn forward(&self, joints: &Joints) -> Pose {
        self.base * self.robot.forward(joints)
    }

    fn forward_with_joint_poses(&self, joints: &Joints) -> [Pose; 6] {
        self.robot.forward_with_joint_poses(joints).map(|pose| self.base * pose)
    }
}
