extern crate nalgebra as na;

use na::Isometry3;

/// Pose is used a pose of the robot flange or gripper tip. It contains both Cartesian position
/// and rotation quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(0.1, 0.05, 0.715);
/// let transform = Pose::from_parts(translation, UnitQuaternion::identity());
/// ```
pub type Pose = Isometry3<f64>;

/// Rotations of the six arm joints, in radians.
pub type Joints = [f64; 6];

/// Complete configuration of one arm: the six arm joints followed by the gripper tip joint.
/// The tip joint spins the rigid tip around its own axis and does not move the control point.
pub type Configuration = [f64; 7];

/// Solutions of the inverse kinematics. Empty if the pose cannot be reached.
pub type Solutions = Vec<Joints>;

/// Index of the gripper tip joint inside the [`Configuration`].
pub const J_TIP: usize = 6;

/// For providing the "previous" position when only the current pose is known
pub const JOINTS_AT_ZERO: Joints = [0.0; 6];

pub trait Kinematics: Send + Sync {
    /// Find inverse kinematics (joint positions) for this pose.
    /// Solutions are cross-checked with forward kinematics before they are returned.
    fn inverse(&self, pose: &Pose) -> Solutions;

    /// Find inverse kinematics starting the search from the given joint positions.
    /// Solutions are sorted by proximity to `previous`, closest first.
    fn inverse_continuing(&self, pose: &Pose, previous: &Joints) -> Solutions;

    /// Find forward kinematics (pose from joint positions).
    fn forward(&self, qs: &Joints) -> Pose;

    /// Poses of the frames attached to each of the six joints, in the same coordinate
    /// system as [`Kinematics::forward`]. The last one is the flange, without any tool.
    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 6];
}

/// Arm joints of the configuration, without the tip joint.
pub fn arm_joints(configuration: &Configuration) -> Joints {
    std::array::from_fn(|i| configuration[i])
}

/// Configuration made of the given arm joints and the tip joint value.
pub fn with_tip(joints: &Joints, tip: f64) -> Configuration {
    let mut configuration = [tip; 7];
    configuration[..6].copy_from_slice(joints);
    configuration
}
