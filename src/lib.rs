//! Sampling of collision-free grasp configurations for a dual-arm paper handling cell.
//!
//! Two UR10 arms work over a sheet of paper lying on a table. The paper is localized by a
//! fiducial marker. The *active* arm must grasp the paper while the *companion* arm follows a
//! known trajectory. This crate finds joint configurations of the active arm that put the
//! gripper tip on the paper without colliding with itself, the furniture or the companion arm
//! at any pose of its trajectory, and ranks them by how much clearance the active arm keeps
//! while moving there.
//!
//! # Features
//!
//! - Grasp points are drawn from weighted bands over the paper, which concentrates samples
//!   where reachable and collision-free grasps are most likely.
//! - Inverse kinematics is numerical (damped least squares) over the Denavit-Hartenberg model
//!   of the arm, seeded from the start configuration so that solutions stay close to it.
//!   All returned solutions are normalized and cross-checked with forward kinematics.
//! - The arm can be equipped with the tool and placed on the base, planning for the gripper tip
//!   in world coordinates rather than for the flange.
//! - Every accepted configuration is validated by forward kinematics against the paper polygon
//!   and checked for collisions against each companion pose (capsule model, `parry3d`).
//! - Clearance is scored along a bi-directional RRT path from the start configuration.
//! - The sampling loop is bounded: instead of spinning forever it reports how many
//!   configurations were found.
//!
//! # Example
//!
//! ```no_run
//! use dual_arm_sampling::experiment::ExperimentConfig;
//!
//! let config = ExperimentConfig { samples: 3, seed: Some(7), ..ExperimentConfig::default() };
//! let result = config.run().expect("Experiment failed");
//! for (configuration, score) in result.configurations.iter().zip(result.scores.unwrap_or_default()) {
//!     println!("{:?}: {:.3}", configuration, score);
//! }
//! ```

pub mod parameters;
pub mod parameters_robots;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod constraints;

pub mod tool;

pub mod frame;

pub mod region;

pub mod sampler;

pub mod error;

pub mod collisions_traits;

pub mod generator;

pub mod clearance;

#[cfg(feature = "collisions")]
pub mod collisions;

#[cfg(feature = "collisions")]
pub mod arm_with_shape;

#[cfg(feature = "collisions")]
pub mod workcell;

#[cfg(feature = "planning")]
#[path = "path_plan/rrt.rs"]
pub mod rrt;

#[cfg(all(feature = "allow_filesystem", feature = "planning"))]
pub mod experiment;

#[cfg(test)]
mod tests;
