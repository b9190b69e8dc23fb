//! Implements collision detection

use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::shape::{Capsule, Cuboid, Shape};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use crate::kinematic_traits::Pose;

/// Index of the gripper shape in collision reports (links are 0 .. 5).
pub const J_GRIPPER: usize = 6;

/// Shapes of the companion arm are reported with this offset added.
pub const COMPANION_START_IDX: usize = 50;

/// Environment objects are reported with this offset added to their index.
pub const ENV_START_IDX: usize = 100;

/// Links closer than this along the chain are not checked against each other: their
/// capsules share or nearly share the joint between them.
const SELF_COLLISION_GAP: usize = 2;

/// The gripper is only checked against the links before the wrist.
const GRIPPER_CHECKED_LINKS: usize = 3;

/// Static object against that we check the arm does not collide.
/// Unlike arm link, it has the global transform allowing to place it
/// where desired.
#[derive(Debug, Clone)]
pub struct CollisionBody {
    /// Box representing this collision object
    pub shape: Cuboid,
    /// Global transform of this collision object.
    pub pose: Isometry3<f32>,
}

impl CollisionBody {
    /// Axis aligned box given by its center and half extents.
    pub fn cuboid(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        CollisionBody {
            shape: Cuboid::new(half_extents),
            pose: Isometry3::translation(center.x, center.y, center.z),
        }
    }
}

/// Gripper attached to the flange, modelled as a capsule from the flange origin towards
/// the rigid tip.
#[derive(Debug, Clone, Copy)]
pub struct Gripper {
    /// Far end of the gripper capsule, in flange coordinates.
    pub end: Point3<f64>,
    pub radius: f32,
}

/// Shape of the arm: one capsule per link, spanning the origins of consecutive joint
/// frames, plus optional gripper.
#[derive(Debug, Clone)]
pub struct ArmBody {
    /// Capsule radius for each link, from the shoulder (base to J2) to the flange.
    pub link_radii: [f32; 6],

    /// Gripper mounted on the flange, if any
    pub gripper: Option<Gripper>,
}

impl ArmBody {
    /// Capsule model of UR10 links (without gripper).
    pub fn ur10() -> Self {
        ArmBody {
            link_radii: [0.075, 0.06, 0.05, 0.045, 0.045, 0.045],
            gripper: None,
        }
    }

    pub fn with_gripper(mut self, gripper: Gripper) -> Self {
        self.gripper = Some(gripper);
        self
    }

    /// Place the arm shapes in the world. `base` is the arm base pose, `joint_poses` are
    /// the world poses of the six joint frames.
    pub fn position(&self, base: &Pose, joint_poses: &[Pose; 6]) -> PositionedArm {
        let mut origins: Vec<Point3<f32>> = Vec::with_capacity(7);
        origins.push(Point3::from(base.translation.vector.cast::<f32>()));
        origins.extend(joint_poses.iter().map(|pose| Point3::from(pose.translation.vector.cast::<f32>())));

        let mut shapes: Vec<(usize, Capsule)> = (0..6)
            .map(|link| (link, Capsule::new(origins[link], origins[link + 1], self.link_radii[link])))
            .collect();

        if let Some(gripper) = &self.gripper {
            let flange = &joint_poses[5];
            let end = (flange * gripper.end).cast::<f32>();
            shapes.push((J_GRIPPER, Capsule::new(origins[6], end, gripper.radius)));
        }

        PositionedArm { shapes, pose: Isometry3::identity() }
    }
}

/// Arm shapes in world coordinates for one configuration.
pub struct PositionedArm {
    /// Shapes with their reporting index (link index or [`J_GRIPPER`]).
    pub shapes: Vec<(usize, Capsule)>,

    /// Capsules are already in world coordinates so all share the identity pose.
    pose: Isometry3<f32>,
}

impl PositionedArm {
    fn shape(&self, index: usize) -> Option<&Capsule> {
        self.shapes.iter().find(|(i, _)| *i == index).map(|(_, capsule)| capsule)
    }
}

/// Struct representing a collision task for detecting collisions
/// between two objects with given transforms and shapes.
struct CollisionTask<'a> {
    i: usize, // reporting index of the first shape
    j: usize, // reporting index of the second shape
    transform_i: &'a Isometry3<f32>,
    transform_j: &'a Isometry3<f32>,
    shape_i: &'a dyn Shape,
    shape_j: &'a dyn Shape,
}

impl CollisionTask<'_> {
    /// Pairs parry3d cannot test are reported as colliding.
    fn intersects(&self) -> bool {
        parry3d::query::intersection_test(
            self.transform_i, self.shape_i, self.transform_j, self.shape_j)
            .unwrap_or(true)
    }

    /// Pairs parry3d cannot measure are reported as touching.
    fn distance(&self) -> f32 {
        parry3d::query::distance(
            self.transform_i, self.shape_i, self.transform_j, self.shape_j)
            .unwrap_or(0.0)
    }
}

/// Parallel version with Rayon
fn process_collision_tasks(tasks: Vec<CollisionTask>, first_collision_only: bool) -> Vec<(usize, usize)> {
    if first_collision_only {
        // Exit as soon as any collision is found
        tasks.par_iter()
            .find_map_any(|task| task.intersects().then_some((task.i, task.j)))
            .into_iter()
            .collect()
    } else {
        tasks.par_iter()
            .filter_map(|task| task.intersects().then_some((task.i, task.j)))
            .collect()
    }
}

fn self_collision_tasks<'a>(arm: &'a PositionedArm, tasks: &mut Vec<CollisionTask<'a>>) {
    for (i, shape_i) in &arm.shapes {
        for (j, shape_j) in &arm.shapes {
            let checked = if *j == J_GRIPPER {
                *i < GRIPPER_CHECKED_LINKS
            } else {
                *i < *j && *j - *i > SELF_COLLISION_GAP
            };
            if checked {
                tasks.push(CollisionTask {
                    i: *i,
                    j: *j,
                    transform_i: &arm.pose,
                    transform_j: &arm.pose,
                    shape_i: shape_i,
                    shape_j: shape_j,
                });
            }
        }
    }
}

/// Detect collisions of the active arm with itself, with the environment and with the
/// companion arm. Returned pairs hold reporting indices; companion shapes are offset by
/// [`COMPANION_START_IDX`] and environment objects by [`ENV_START_IDX`].
pub fn detect_collisions(
    active: &PositionedArm,
    companion: &PositionedArm,
    environment: &[CollisionBody],
    first_collision_only: bool,
) -> Vec<(usize, usize)> {
    let shapes = active.shapes.len();
    let mut tasks = Vec::with_capacity(
        shapes * (shapes + companion.shapes.len() + environment.len()));

    self_collision_tasks(active, &mut tasks);

    for (i, shape_i) in &active.shapes {
        for (env_idx, env_obj) in environment.iter().enumerate() {
            tasks.push(CollisionTask {
                i: *i,
                j: ENV_START_IDX + env_idx,
                transform_i: &active.pose,
                transform_j: &env_obj.pose,
                shape_i: shape_i,
                shape_j: &env_obj.shape,
            });
        }
        for (j, shape_j) in &companion.shapes {
            tasks.push(CollisionTask {
                i: *i,
                j: COMPANION_START_IDX + *j,
                transform_i: &active.pose,
                transform_j: &companion.pose,
                shape_i: shape_i,
                shape_j: shape_j,
            });
        }
    }
    process_collision_tasks(tasks, first_collision_only)
}

/// Closest distance between any shape of the first arm and any shape of the second.
pub fn arm_distance(a: &PositionedArm, b: &PositionedArm) -> f32 {
    let tasks: Vec<CollisionTask> = a.shapes.iter()
        .flat_map(|(i, shape_i)| b.shapes.iter().map(move |(j, shape_j)| CollisionTask {
            i: *i,
            j: COMPANION_START_IDX + *j,
            transform_i: &a.pose,
            transform_j: &b.pose,
            shape_i: shape_i as &dyn Shape,
            shape_j: shape_j as &dyn Shape,
        }))
        .collect();
    tasks.par_iter()
        .map(|task| task.distance())
        .reduce(|| f32::INFINITY, f32::min)
}

/// Distance from the given shape of the first arm (link index or [`J_GRIPPER`]) to the
/// second arm. None if the first arm has no such shape.
pub fn shape_distance(a: &PositionedArm, index: usize, b: &PositionedArm) -> Option<f32> {
    let shape = a.shape(index)?;
    let distance = b.shapes.iter()
        .map(|(j, other)| CollisionTask {
            i: index,
            j: COMPANION_START_IDX + *j,
            transform_i: &a.pose,
            transform_j: &b.pose,
            shape_i: shape,
            shape_j: other,
        }.distance())
        .fold(f32::INFINITY, f32::min);
    Some(distance)
}
