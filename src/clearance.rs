//! Scoring of accepted configurations by how far the active arm stays from the companion
//! while moving there.

use tracing::{info, warn};
use crate::collisions_traits::CollisionDetector;
use crate::error::SamplingError;
use crate::kinematic_traits::Configuration;
use crate::utils::to_degrees;

/// Weight of the clearance samples along the path; the final clearance gets the rest.
const PATH_WEIGHT: f64 = 0.5;

/// Collision-free path of the active arm, start and goal included, with the clearance
/// to the companion arm measured along it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPath {
    pub waypoints: Vec<Configuration>,

    /// Clearance samples along the path, meters.
    pub clearances: Vec<f64>,
}

/// Plans motions of the active arm while the companion arm stays at one configuration.
pub trait MotionPlanner {
    fn plan(
        &self,
        detector: &dyn CollisionDetector,
        start: &Configuration,
        goal: &Configuration,
        companion: &Configuration,
    ) -> Result<PlannedPath, SamplingError>;
}

/// Outcome of evaluating one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearanceReport {
    pub goal: Configuration,
    pub score: f64,

    /// None if planning failed.
    pub path: Option<PlannedPath>,

    /// Clearance between the active gripper and the companion at the goal, if planned.
    pub final_clearance: Option<f64>,
}

/// `Σ (0.5 / n)·d_i + 0.5·d_final`. Without samples along the path only the final term
/// is counted.
pub fn blended_clearance(samples: &[f64], final_clearance: f64) -> f64 {
    let along_path = if samples.is_empty() {
        0.0
    } else {
        let weight = PATH_WEIGHT / samples.len() as f64;
        samples.iter().map(|d| weight * d).sum()
    };
    along_path + (1.0 - PATH_WEIGHT) * final_clearance
}

/// Computes the clearance score for each goal configuration, planning from the start of the
/// active arm with the companion held at the first pose of its trajectory.
pub struct ClearanceEvaluator<'a> {
    planner: &'a dyn MotionPlanner,
    detector: &'a dyn CollisionDetector,
}

impl<'a> ClearanceEvaluator<'a> {
    pub fn new(planner: &'a dyn MotionPlanner, detector: &'a dyn CollisionDetector) -> Self {
        ClearanceEvaluator { planner, detector }
    }

    /// One score per configuration, in input order. Planner failures score exactly 0.
    pub fn evaluate(
        &self,
        configurations: &[Configuration],
        active_start: &Configuration,
        companion_trajectory: &[Configuration],
    ) -> Result<Vec<f64>, SamplingError> {
        let reports = self.evaluate_detailed(configurations, active_start, companion_trajectory)?;
        Ok(reports.into_iter().map(|report| report.score).collect())
    }

    /// As [`Self::evaluate`], keeping the planned paths and clearance samples.
    pub fn evaluate_detailed(
        &self,
        configurations: &[Configuration],
        active_start: &Configuration,
        companion_trajectory: &[Configuration],
    ) -> Result<Vec<ClearanceReport>, SamplingError> {
        let companion = companion_trajectory.first()
            .ok_or(SamplingError::EmptyCompanionTrajectory)?;

        let reports = configurations.iter()
            .enumerate()
            .map(|(index, goal)| self.evaluate_one(index, goal, active_start, companion))
            .collect();
        Ok(reports)
    }

    fn evaluate_one(
        &self,
        index: usize,
        goal: &Configuration,
        start: &Configuration,
        companion: &Configuration,
    ) -> ClearanceReport {
        match self.planner.plan(self.detector, start, goal, companion) {
            Ok(path) => {
                let final_clearance = self.detector.tool_clearance(goal, companion);
                let score = blended_clearance(&path.clearances, final_clearance);
                info!("Configuration {}: clearance score {:.4} over {} samples",
                    index, score, path.clearances.len());
                ClearanceReport {
                    goal: *goal,
                    score,
                    path: Some(path),
                    final_clearance: Some(final_clearance),
                }
            }
            Err(err) => {
                warn!("Configuration {} {:?}: {}, scored 0", index, to_degrees(goal), err);
                ClearanceReport {
                    goal: *goal,
                    score: 0.0,
                    path: None,
                    final_clearance: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blended_clearance() {
        assert_eq!(blended_clearance(&[], 0.4), 0.2);
        let score = blended_clearance(&[0.2, 0.4, 0.6], 1.0);
        assert!((score - (0.5 * 0.4 + 0.5)).abs() < 1E-12);
        assert_eq!(blended_clearance(&[0.0, 0.0], 0.0), 0.0);
    }
}
