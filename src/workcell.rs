//! The dual arm cell: the active arm that grasps the paper, the companion arm that follows
//! its scripted trajectory, and the static furniture around them.

use nalgebra::{Point3, Vector3};
use std::f64::consts::FRAC_PI_2;
use tracing::trace;
use crate::arm_with_shape::ArmWithShape;
use crate::collisions::{arm_distance, detect_collisions, shape_distance, CollisionBody, J_GRIPPER};
use crate::collisions_traits::CollisionDetector;
use crate::kinematic_traits::Configuration;
use crate::region::TABLE_HEIGHT;

/// Position of the active arm base in the paper handover cell.
pub const ACTIVE_BASE: [f64; 3] = [0.885, 0.012, 0.786];

/// Position of the companion arm base in the paper handover cell.
pub const COMPANION_BASE: [f64; 3] = [-0.916, 0.0, 0.77];

/// Immutable description of the cell. All queries take both configurations explicitly.
#[derive(Clone)]
pub struct Workcell {
    pub active: ArmWithShape,
    pub companion: ArmWithShape,

    /// Static obstacles the active arm must avoid. The table the active arm stands on is not
    /// included as the arm base is mounted on it.
    pub environment: Vec<CollisionBody>,
}

impl Workcell {
    pub fn new(active: ArmWithShape, companion: ArmWithShape, environment: Vec<CollisionBody>) -> Self {
        Workcell { active, companion, environment }
    }

    /// Two UR10 arms facing each other across the table with the paper.
    /// In the simulated cell the active arm is rotated +90 degrees around the vertical axis
    /// and the companion -90 degrees; `mirrored` swaps these mounting rotations, as in the
    /// physical cell.
    pub fn paper_handover(mirrored: bool) -> Self {
        let (active_yaw, companion_yaw) = if mirrored {
            (-FRAC_PI_2, FRAC_PI_2)
        } else {
            (FRAC_PI_2, -FRAC_PI_2)
        };
        let active = ArmWithShape::ur10_with_gripper(Vector3::from(ACTIVE_BASE), active_yaw);
        let companion = ArmWithShape::ur10_with_gripper(Vector3::from(COMPANION_BASE), companion_yaw);

        let table_top = TABLE_HEIGHT as f32;
        let companion_table_top = (COMPANION_BASE[2] - 0.01) as f32;
        let environment = vec![
            // Floor
            CollisionBody::cuboid(Point3::new(0.0, 0.0, -0.05), Vector3::new(5.0, 5.0, 0.05)),
            // Table with the paper
            CollisionBody::cuboid(Point3::new(0.0, 0.0, table_top / 2.0),
                                  Vector3::new(0.4, 0.6, table_top / 2.0)),
            // Table carrying the companion arm
            CollisionBody::cuboid(Point3::new(-1.381, 0.0, companion_table_top / 2.0),
                                  Vector3::new(0.55, 0.45, companion_table_top / 2.0)),
        ];
        Workcell::new(active, companion, environment)
    }

    /// All colliding shape pairs of the active arm at `active` with the companion at
    /// `companion`. See [`crate::collisions::detect_collisions`] for the index convention.
    pub fn collision_details(&self, active: &Configuration, companion: &Configuration) -> Vec<(usize, usize)> {
        let active_arm = self.active.positioned(active);
        let companion_arm = self.companion.positioned(companion);
        detect_collisions(&active_arm, &companion_arm, &self.environment, false)
    }
}

impl CollisionDetector for Workcell {
    fn collides(&self, active: &Configuration, companion: &Configuration) -> bool {
        let active_arm = self.active.positioned(active);
        let companion_arm = self.companion.positioned(companion);
        let collisions = detect_collisions(&active_arm, &companion_arm, &self.environment, true);
        if let Some((i, j)) = collisions.first() {
            trace!("Shapes {} and {} collide", i, j);
            return true;
        }
        false
    }

    fn clearance(&self, active: &Configuration, companion: &Configuration) -> f64 {
        let active_arm = self.active.positioned(active);
        let companion_arm = self.companion.positioned(companion);
        arm_distance(&active_arm, &companion_arm).max(0.0) as f64
    }

    /// Distance from the active gripper to the companion arm.
    fn tool_clearance(&self, active: &Configuration, companion: &Configuration) -> f64 {
        let active_arm = self.active.positioned(active);
        let companion_arm = self.companion.positioned(companion);
        match shape_distance(&active_arm, J_GRIPPER, &companion_arm) {
            Some(distance) => distance.max(0.0) as f64,
            None => arm_distance(&active_arm, &companion_arm).max(0.0) as f64,
        }
    }
}
