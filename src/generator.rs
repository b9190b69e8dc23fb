//! Generation of collision-free grasp configurations of the active arm.
//!
//! Each attempt samples a grasp point and orientation over the paper, solves inverse
//! kinematics for the gripper tip, validates the solution with forward kinematics against
//! the paper polygon and finally checks it for collisions against every pose of the
//! companion trajectory. Rejected attempts are simply retried until enough configurations
//! are accepted or the attempt budget runs out.

use std::fmt;
use nalgebra::{Matrix3, Point2, Rotation3, Translation3, UnitQuaternion};
use rand::Rng;
use tracing::{debug, info};
use crate::collisions_traits::CollisionDetector;
use crate::error::SamplingError;
use crate::frame::MarkerFrame;
use crate::kinematic_traits::{arm_joints, with_tip, Configuration, Kinematics, Pose, J_TIP};
use crate::region::RegionPolygon;
use crate::sampler::WeightedSampler;
use crate::utils::to_degrees;

/// Height of the gripper tip when grasping: the paper lies at 0.71, the tip stays 5 mm above.
pub const TIP_HEIGHT: f64 = 0.715;

/// Default limit on the number of attempts for one generation run.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Reason why a single attempt did not produce a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No inverse kinematics solution for the sampled grasp pose.
    IkInfeasible,
    /// The solved tip is not strictly inside the paper.
    OutOfRegion,
    /// The solved tip is inside the excluded gripper footprint.
    InsideExclusion,
    /// Collision while the companion arm is at the pose with this index of its trajectory.
    Collision { companion_index: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::IkInfeasible => write!(f, "no IK solution"),
            Rejection::OutOfRegion => write!(f, "tip not on the paper"),
            Rejection::InsideExclusion => write!(f, "tip inside the excluded footprint"),
            Rejection::Collision { companion_index } =>
                write!(f, "collision at companion pose {}", companion_index),
        }
    }
}

/// Counts of attempt outcomes over a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub attempts: usize,
    pub accepted: usize,
    pub ik_infeasible: usize,
    pub out_of_region: usize,
    pub inside_exclusion: usize,
    pub collisions: usize,
}

impl GenerationStats {
    fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::IkInfeasible => self.ik_infeasible += 1,
            Rejection::OutOfRegion => self.out_of_region += 1,
            Rejection::InsideExclusion => self.inside_exclusion += 1,
            Rejection::Collision { .. } => self.collisions += 1,
        }
    }

    /// Share of attempts that were accepted, 0 if nothing was attempted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.attempts as f64
    }
}

/// Target pose of the gripper tip: at (x, y, z), tool z axis pointing down, rotated by
/// `theta` around the vertical axis.
pub fn grasp_pose(x: f64, y: f64, z: f64, theta: f64) -> Pose {
    let (s, c) = theta.sin_cos();
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::new(
        c, s, 0.0,
        s, -c, 0.0,
        0.0, 0.0, -1.0,
    ));
    Pose::from_parts(Translation3::new(x, y, z), UnitQuaternion::from_rotation_matrix(&rotation))
}

/// Samples grasp configurations of the active arm.
///
/// `kinematics` must produce gripper tip poses in world coordinates (arm on its base with the
/// tip as the tool). The generator does not change any state it borrows, and the random
/// source is passed to each call, so seeded runs are reproducible.
pub struct ConfigurationGenerator<'a> {
    kinematics: &'a dyn Kinematics,
    detector: &'a dyn CollisionDetector,
    frame: MarkerFrame,
    region: RegionPolygon,
    sampler: WeightedSampler,
    companion_trajectory: &'a [Configuration],
    seed: Configuration,
    max_attempts: usize,
    exclusion: Option<RegionPolygon>,
}

impl<'a> ConfigurationGenerator<'a> {
    /// Generator over the paper localized by `frame`. IK is seeded from `seed`, normally the
    /// start configuration of the active arm; its tip joint is copied into every result.
    pub fn new(
        kinematics: &'a dyn Kinematics,
        detector: &'a dyn CollisionDetector,
        frame: MarkerFrame,
        companion_trajectory: &'a [Configuration],
        seed: Configuration,
    ) -> Self {
        ConfigurationGenerator {
            kinematics,
            detector,
            frame,
            region: RegionPolygon::paper(&frame),
            sampler: WeightedSampler::default(),
            companion_trajectory,
            seed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            exclusion: None,
        }
    }

    pub fn with_sampler(mut self, sampler: WeightedSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Reject grasps whose tip falls inside this polygon (typically the footprint of the
    /// companion gripper).
    pub fn with_exclusion(mut self, exclusion: RegionPolygon) -> Self {
        self.exclusion = Some(exclusion);
        self
    }

    pub fn region(&self) -> &RegionPolygon {
        &self.region
    }

    /// One sample, IK, validation and collision check cycle.
    pub fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Configuration, Rejection> {
        let theta = self.sampler.sample_orientation(rng);
        let (x, y) = self.sampler.sample_xy(rng);
        let point = self.frame.to_world(&Point2::new(x, y));
        let target = grasp_pose(point.x, point.y, TIP_HEIGHT, theta);

        let solutions = self.kinematics.inverse_continuing(&target, &arm_joints(&self.seed));
        let joints = solutions.first().ok_or(Rejection::IkInfeasible)?;

        let tip = self.kinematics.forward(joints).translation;
        if !self.region.contains(tip.x, tip.y) {
            return Err(Rejection::OutOfRegion);
        }
        if let Some(exclusion) = &self.exclusion {
            if exclusion.contains(tip.x, tip.y) {
                return Err(Rejection::InsideExclusion);
            }
        }

        let candidate = with_tip(joints, self.seed[J_TIP]);
        let colliding = self.companion_trajectory.iter()
            .position(|companion| self.detector.collides(&candidate, companion));
        match colliding {
            Some(companion_index) => Err(Rejection::Collision { companion_index }),
            None => Ok(candidate),
        }
    }

    /// Produce exactly `count` accepted configurations, in acceptance order.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R)
                                     -> Result<Vec<Configuration>, SamplingError> {
        self.generate_with_stats(count, rng).map(|(configurations, _)| configurations)
    }

    /// As [`Self::generate`], also reporting how the attempts went.
    pub fn generate_with_stats<R: Rng + ?Sized>(&self, count: usize, rng: &mut R)
                                                -> Result<(Vec<Configuration>, GenerationStats), SamplingError> {
        if self.companion_trajectory.is_empty() {
            return Err(SamplingError::EmptyCompanionTrajectory);
        }
        let mut stats = GenerationStats::default();
        let mut accepted = Vec::with_capacity(count);

        while accepted.len() < count {
            if stats.attempts >= self.max_attempts {
                info!("Giving up after {} attempts: {:?}", stats.attempts, stats);
                return Err(SamplingError::AttemptsExhausted {
                    accepted: stats.accepted,
                    requested: count,
                    attempts: stats.attempts,
                });
            }
            stats.attempts += 1;
            match self.attempt(rng) {
                Ok(configuration) => {
                    info!("Accepted configuration {} of {}: {:?}",
                        accepted.len() + 1, count, to_degrees(&configuration));
                    accepted.push(configuration);
                    stats.accepted = accepted.len();
                }
                Err(rejection) => {
                    debug!("Attempt {} rejected: {}", stats.attempts, rejection);
                    stats.record(&rejection);
                }
            }
        }
        debug!("Generation finished: {:?}", stats);
        Ok((accepted, stats))
    }
}
