use std::sync::Arc;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use crate::collisions::{ArmBody, Gripper, PositionedArm};
use crate::constraints::Constraints;
use crate::kinematic_traits::{arm_joints, Configuration, Kinematics, Pose};
use crate::kinematics_impl::DhKinematics;
use crate::parameters::dh_kinematics::Parameters;
use crate::tool::{Base, Tool};

/// Offset of the rigid gripper tip from the flange, in flange coordinates, meters.
pub const TIP_OFFSET: [f64; 3] = [0.072004, -0.05955, 0.141103];

/// Struct that combines the kinematic model of an arm with its geometrical shape.
/// The kinematics include the base (arm placement in the cell) and the tool (the rigid
/// gripper tip), so poses for forward and inverse kinematics are tip poses in world
/// coordinates.
#[derive(Clone)]
pub struct ArmWithShape {
    /// Kinematic model of the arm on its base, with the gripper tip as the tool.
    pub kinematics: Arc<dyn Kinematics>,

    /// Where the arm is installed in the world.
    pub base: Pose,

    /// Capsule model for collision detection.
    pub body: ArmBody,
}

impl ArmWithShape {
    /// Constructs the arm from its DH parameters, placing it at `base` and attaching the
    /// tool described by `tool` (flange to control point).
    pub fn new(
        parameters: Parameters,
        constraints: Option<Constraints>,
        base: Pose,
        tool: Pose,
        body: ArmBody,
    ) -> Self {
        ArmWithShape {
            kinematics: Arc::new(Self::create_robot_with_base_and_tool(
                base, tool, parameters, constraints)),
            base,
            body,
        }
    }

    /// UR10 with the paper handling gripper, standing at the given position and rotated
    /// by `yaw` around the vertical axis.
    pub fn ur10_with_gripper(position: Vector3<f64>, yaw: f64) -> Self {
        let base = Isometry3::from_parts(
            Translation3::from(position),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw),
        );
        let tool = Isometry3::translation(TIP_OFFSET[0], TIP_OFFSET[1], TIP_OFFSET[2]);

        // Capsule stops short of the tip by its radius so that the tip may touch the paper
        let gripper = Gripper {
            end: Point3::new(TIP_OFFSET[0], TIP_OFFSET[1], TIP_OFFSET[2] - 0.021),
            radius: 0.02,
        };
        Self::new(Parameters::ur10(), None, base, tool, ArmBody::ur10().with_gripper(gripper))
    }

    fn create_robot_with_base_and_tool(
        base: Pose,
        tool: Pose,
        parameters: Parameters,
        constraints: Option<Constraints>) -> Tool {
        let plain_robot = match constraints {
            Some(constraints) => DhKinematics::new_with_constraints(parameters, constraints),
            None => DhKinematics::new(parameters),
        };

        let robot_with_base = Base {
            robot: Arc::new(plain_robot),
            base,
        };

        Tool {
            robot: Arc::new(robot_with_base),
            tool,
        }
    }

    /// Pose of the gripper tip. The tip joint does not affect it.
    pub fn tip_pose(&self, configuration: &Configuration) -> Pose {
        self.kinematics.forward(&arm_joints(configuration))
    }

    /// Arm shapes placed in the world for the given configuration.
    pub fn positioned(&self, configuration: &Configuration) -> PositionedArm {
        let joint_poses = self.kinematics.forward_with_joint_poses(&arm_joints(configuration));
        self.body.position(&self.base, &joint_poses)
    }
}
