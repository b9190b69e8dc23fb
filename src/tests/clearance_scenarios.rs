#[cfg(test)]
mod tests {
    use crate::clearance::{blended_clearance, ClearanceEvaluator};
    use crate::error::SamplingError;
    use crate::kinematic_traits::Configuration;
    use crate::tests::test_utils::{companion_at, DiscDetector, FailingPlanner, StraightPlanner};

    const START: Configuration = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];

    #[test]
    fn test_planner_failure_scores_zero() {
        let detector = DiscDetector { radius: 0.1 };
        let evaluator = ClearanceEvaluator::new(&FailingPlanner, &detector);
        let goals = vec![companion_at(0.5, 0.5), companion_at(0.7, 0.2)];
        let scores = evaluator.evaluate(&goals, &START, &[companion_at(0.0, 0.0)])
            .expect("failures are scored, not reported");
        assert_eq!(scores, vec![0.0, 0.0]);

        let reports = evaluator.evaluate_detailed(&goals, &START, &[companion_at(0.0, 0.0)])
            .expect("reports");
        assert!(reports.iter().all(|r| r.path.is_none() && r.final_clearance.is_none()));
    }

    #[test]
    fn test_scores_follow_input_order() {
        let detector = DiscDetector { radius: 0.1 };
        let evaluator = ClearanceEvaluator::new(&StraightPlanner, &detector);
        // Companion at the origin, its later poses must not matter
        let companion = vec![companion_at(0.0, 0.0), companion_at(0.9, 0.9)];
        let near = companion_at(0.3, 0.0);
        let far = companion_at(0.0, 0.8);
        let scores = evaluator.evaluate(&[near, far, near], &START, &companion).expect("scores");
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| *s >= 0.0));
        assert!(scores[1] > scores[0]);
        assert_eq!(scores[0], scores[2]);

        // Path samples at start, middle and goal, final clearance at goal
        let start_gap = 2.0_f64.sqrt() - 0.2;
        let middle_gap = (0.65_f64 * 0.65 + 0.5 * 0.5).sqrt() - 0.2;
        let goal_gap = 0.3 - 0.2;
        let expected = blended_clearance(&[start_gap, middle_gap, goal_gap], goal_gap);
        assert!((scores[0] - expected).abs() < 1E-12);
    }

    #[test]
    fn test_detailed_report() {
        let detector = DiscDetector { radius: 0.1 };
        let evaluator = ClearanceEvaluator::new(&StraightPlanner, &detector);
        let goal = companion_at(0.0, 0.8);
        let reports = evaluator.evaluate_detailed(&[goal], &START, &[companion_at(0.0, 0.0)])
            .expect("reports");
        let report = &reports[0];
        assert_eq!(report.goal, goal);
        let path = report.path.as_ref().expect("planned");
        assert_eq!(path.waypoints.first(), Some(&START));
        assert_eq!(path.waypoints.last(), Some(&goal));
        let final_clearance = report.final_clearance.expect("planned");
        assert!((final_clearance - 0.6).abs() < 1E-12);
        assert_eq!(report.score, blended_clearance(&path.clearances, final_clearance));
    }

    #[test]
    fn test_no_configurations_no_scores() {
        let detector = DiscDetector { radius: 0.1 };
        let evaluator = ClearanceEvaluator::new(&StraightPlanner, &detector);
        let scores = evaluator.evaluate(&[], &START, &[companion_at(0.0, 0.0)]).expect("empty");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_companion_start_required() {
        let detector = DiscDetector { radius: 0.1 };
        let evaluator = ClearanceEvaluator::new(&StraightPlanner, &detector);
        assert!(matches!(evaluator.evaluate(&[START], &START, &[]),
            Err(SamplingError::EmptyCompanionTrajectory)));
    }
}
