use std::cell::RefCell;
use std::time::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use crate::clearance::{MotionPlanner, PlannedPath};
use crate::collisions_traits::CollisionDetector;
use crate::constraints::Constraints;
use crate::error::SamplingError;
use crate::kinematic_traits::Configuration;

#[derive(Debug, Clone)]
/// Defines the RRT planner that relocates the active arm between the two configurations
/// in a collision free way, measuring how close it passes to the companion arm.
pub struct RrtPlanner {
    /// Step size in the joint space (value in Radians). This should be small
    /// enough to prevent the arm colliding with something while moving
    /// in possibly less predictable way between the joints.
    pub step_size_joint_space: f64,

    /// The "max try" parameter of RRT algorithm, reasonable values
    /// are in order 1000 ... 4000
    pub max_try: usize,

    /// Range from which random configurations are drawn, all seven joints.
    pub limits: Constraints<7>,

    /// Seed of the random sampler. If None, every plan is different.
    pub seed: Option<u64>,

    /// Shorten the raw RRT path by replacing detours with straight collision-free segments.
    pub shortcut: bool,
}

impl Default for RrtPlanner {
    fn default() -> Self {
        Self {
            step_size_joint_space: 3_f64.to_radians(),
            max_try: 2000,
            limits: Constraints::unconstrained(),
            seed: None,
            shortcut: true,
        }
    }
}

impl RrtPlanner {
    /// Plans a path from `start` to `goal`, checking each new node for collisions.
    /// start and goal are included into the returned path.
    fn plan_path(
        &self,
        detector: &dyn CollisionDetector,
        start: &Configuration,
        goal: &Configuration,
        companion: &Configuration,
    ) -> Result<Vec<Vec<f64>>, String> {
        let collision_free = |joint_angles: &[f64]| -> bool {
            match <Configuration>::try_from(joint_angles) {
                Ok(configuration) => !detector.collides(&configuration, companion),
                Err(_) => false,
            }
        };

        let rng = RefCell::new(match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });

        // RRT requires vector and we return array so convert
        let random_joint_angles = || -> Vec<f64> {
            self.limits.random_angles(&mut *rng.borrow_mut()).to_vec()
        };

        ::rrt::dual_rrt_connect(
            start, goal, collision_free,
            random_joint_angles, self.step_size_joint_space, // Step size in joint space
            self.max_try,  // Max iterations
        )
    }

    fn convert_result(&self, data: Vec<Vec<f64>>) -> Result<Vec<Configuration>, SamplingError> {
        data.into_iter()
            .map(|vec| <Configuration>::try_from(vec.as_slice()).map_err(|_| {
                SamplingError::PlannerFailed(
                    format!("Waypoint with {} joints instead of 7", vec.len()))
            }))
            .collect()
    }

    /// Number of steps needed to move from a to b without any joint moving more than the step size.
    fn steps_between(&self, a: &Configuration, b: &Configuration) -> usize {
        let largest = a.iter().zip(b)
            .map(|(x, y)| (y - x).abs())
            .fold(0.0, f64::max);
        (largest / self.step_size_joint_space).ceil().max(1.0) as usize
    }

    fn segment_free(
        &self,
        detector: &dyn CollisionDetector,
        a: &Configuration,
        b: &Configuration,
        companion: &Configuration,
    ) -> bool {
        let steps = self.steps_between(a, b);
        (1..steps).all(|k| !detector.collides(&interpolate(a, b, k as f64 / steps as f64), companion))
    }

    /// Greedy shortcut: from each kept waypoint, jump to the farthest waypoint reachable along
    /// a straight collision-free segment.
    fn shortcut_path(
        &self,
        detector: &dyn CollisionDetector,
        path: Vec<Configuration>,
        companion: &Configuration,
    ) -> Vec<Configuration> {
        if path.len() < 3 {
            return path;
        }
        let last = path.len() - 1;
        let mut result = vec![path[0]];
        let mut from = 0;
        while from < last {
            let mut to = last;
            while to > from + 1 && !self.segment_free(detector, &path[from], &path[to], companion) {
                to -= 1;
            }
            result.push(path[to]);
            from = to;
        }
        result
    }

    /// Insert intermediate configurations so that consecutive waypoints are at most one step apart.
    fn densify(&self, path: &[Configuration]) -> Vec<Configuration> {
        let mut dense = Vec::with_capacity(path.len());
        if let Some(first) = path.first() {
            dense.push(*first);
        }
        for pair in path.windows(2) {
            let steps = self.steps_between(&pair[0], &pair[1]);
            for k in 1..steps {
                dense.push(interpolate(&pair[0], &pair[1], k as f64 / steps as f64));
            }
            dense.push(pair[1]);
        }
        dense
    }
}

fn interpolate(a: &Configuration, b: &Configuration, t: f64) -> Configuration {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

impl MotionPlanner for RrtPlanner {
    /// Plans collision-free relocation from `start` into `goal` while the companion
    /// stays at `companion`. The returned path is densified to the step size and carries
    /// the clearance to the companion at every waypoint.
    fn plan(
        &self,
        detector: &dyn CollisionDetector,
        start: &Configuration,
        goal: &Configuration,
        companion: &Configuration,
    ) -> Result<PlannedPath, SamplingError> {
        let started = Instant::now();
        let raw = self.plan_path(detector, start, goal, companion)
            .map_err(SamplingError::PlannerFailed)?;
        let mut path = self.convert_result(raw)?;
        let raw_length = path.len();
        if self.shortcut {
            path = self.shortcut_path(detector, path, companion);
        }
        let waypoints = self.densify(&path);
        let clearances = waypoints.iter()
            .map(|waypoint| detector.clearance(waypoint, companion))
            .collect();
        debug!("RRT took {:?}, {} nodes, {} after shortcut, {} waypoints",
            started.elapsed(), raw_length, path.len(), waypoints.len());
        Ok(PlannedPath { waypoints, clearances })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Joint space with a slab across the first joint, 1.0 < q0 < 1.2, and clearance equal
    /// to the distance from the slab.
    struct Slab;

    impl CollisionDetector for Slab {
        fn collides(&self, active: &Configuration, _companion: &Configuration) -> bool {
            active[0] > 1.0 && active[0] < 1.2
        }

        fn clearance(&self, active: &Configuration, _companion: &Configuration) -> f64 {
            (active[0] - 1.1).abs()
        }
    }

    const START: Configuration = [0.0, -1.0, 1.0, -1.5, -1.5, 0.0, 0.0];

    fn planner() -> RrtPlanner {
        RrtPlanner { seed: Some(17), max_try: 300, ..RrtPlanner::default() }
    }

    #[test]
    fn test_straight_path_in_free_space() {
        let goal: Configuration = [0.8, -1.2, 1.4, -1.5, -1.5, 0.3, 0.0];
        let planner = planner();
        let path = planner.plan(&Slab, &START, &goal, &[0.0; 7]).expect("free space");
        assert_eq!(path.waypoints.first(), Some(&START));
        let last = path.waypoints.last().expect("not empty");
        for (a, b) in last.iter().zip(&goal) {
            assert!((a - b).abs() < 1E-12);
        }
        assert_eq!(path.waypoints.len(), path.clearances.len());
        // Shortcut leaves a single segment, densified to 3 degree steps
        assert_eq!(path.waypoints.len(), planner.steps_between(&START, &goal) + 1);
        for pair in path.waypoints.windows(2) {
            for (a, b) in pair[0].iter().zip(&pair[1]) {
                assert!((a - b).abs() <= planner.step_size_joint_space + 1E-12);
            }
        }
        assert!(path.clearances.iter().all(|d| *d > 0.0));
    }

    #[test]
    fn test_blocked_goal_fails() {
        let goal: Configuration = [2.0, -1.0, 1.0, -1.5, -1.5, 0.0, 0.0];
        let result = planner().plan(&Slab, &START, &goal, &[0.0; 7]);
        assert!(matches!(result, Err(SamplingError::PlannerFailed(_))));
    }

    #[test]
    fn test_densify_keeps_endpoints() {
        let planner = planner();
        let goal: Configuration = [0.1, -1.0, 1.0, -1.5, -1.5, 0.0, 0.0];
        let dense = planner.densify(&[START, goal]);
        assert_eq!(dense.len(), 3);
        assert_eq!(dense[0], START);
        assert_eq!(dense[2], goal);
        assert!((dense[1][0] - 0.05).abs() < 1E-12);
    }
}
