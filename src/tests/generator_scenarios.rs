#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::collisions_traits::CollisionDetector;
    use crate::error::SamplingError;
    use crate::frame::MarkerFrame;
    use crate::generator::{ConfigurationGenerator, Rejection, TIP_HEIGHT};
    use crate::kinematic_traits::{arm_joints, Configuration, Kinematics};
    use crate::region::RegionPolygon;
    use crate::tests::test_utils::{companion_at, DiscDetector, PointArm};

    fn marker() -> MarkerFrame {
        MarkerFrame::from_yaw(Vector3::new(0.02, -0.01, 0.71), 0.3)
    }

    /// Marker not rotated: paper corners need no rounding, so every sample is on the paper.
    fn aligned_marker() -> MarkerFrame {
        MarkerFrame::from_yaw(Vector3::new(0.02, -0.01, 0.71), 0.0)
    }

    const SEED: Configuration = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.7];

    #[test]
    fn test_accepted_configurations_are_on_paper_and_free() {
        let arm = PointArm::new(5.0);
        let detector = DiscDetector { radius: 0.02 };
        let companion = vec![companion_at(0.02, 0.09), companion_at(-0.05, 0.0), companion_at(3.0, 3.0)];
        let generator = ConfigurationGenerator::new(&arm, &detector, marker(), &companion, SEED);
        let mut rng = StdRng::seed_from_u64(11);

        let (configurations, stats) = generator.generate_with_stats(25, &mut rng)
            .expect("enough attempts");
        assert_eq!(configurations.len(), 25);
        assert_eq!(stats.accepted, 25);
        assert_eq!(stats.attempts, stats.accepted + stats.ik_infeasible + stats.out_of_region
            + stats.inside_exclusion + stats.collisions);

        for configuration in &configurations {
            let tip = arm.forward(&arm_joints(configuration)).translation;
            assert!(generator.region().contains(tip.x, tip.y), "Tip {:?} not on paper", tip);
            assert!((tip.z - TIP_HEIGHT).abs() < 1E-12);
            for pose in &companion {
                assert!(!detector.collides(configuration, pose));
            }
            assert_eq!(configuration[6], 0.7, "Tip joint must come from the seed");
        }
    }

    #[test]
    fn test_same_seed_same_configurations() {
        let arm = PointArm::new(5.0);
        let detector = DiscDetector { radius: 0.01 };
        let companion = vec![companion_at(0.0, 0.05)];
        let generator = ConfigurationGenerator::new(&arm, &detector, marker(), &companion, SEED);
        let a = generator.generate(5, &mut StdRng::seed_from_u64(3)).expect("a");
        let b = generator.generate(5, &mut StdRng::seed_from_u64(3)).expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempt_cap() {
        let arm = PointArm::new(0.0);
        let detector = DiscDetector { radius: 0.01 };
        let companion = vec![companion_at(3.0, 3.0)];
        let generator = ConfigurationGenerator::new(&arm, &detector, marker(), &companion, SEED)
            .with_max_attempts(50);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(generator.attempt(&mut rng), Err(Rejection::IkInfeasible));
        match generator.generate(3, &mut rng) {
            Err(SamplingError::AttemptsExhausted { accepted, requested, attempts }) => {
                assert_eq!(accepted, 0);
                assert_eq!(requested, 3);
                assert_eq!(attempts, 50);
            }
            other => panic!("Expected AttemptsExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_attempt_cap_reports_accepted_so_far() {
        let arm = PointArm::new(5.0);
        let detector = DiscDetector { radius: 0.01 };
        let companion = vec![companion_at(3.0, 3.0)];
        let generator = ConfigurationGenerator::new(&arm, &detector, aligned_marker(), &companion, SEED)
            .with_max_attempts(3);
        match generator.generate(5, &mut StdRng::seed_from_u64(8)) {
            Err(SamplingError::AttemptsExhausted { accepted, requested, attempts }) => {
                assert_eq!(accepted, 3);
                assert_eq!(requested, 5);
                assert_eq!(attempts, 3);
            }
            other => panic!("Expected AttemptsExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_requested() {
        let arm = PointArm::new(0.0);
        let detector = DiscDetector { radius: 0.01 };
        let companion = vec![companion_at(3.0, 3.0)];
        let generator = ConfigurationGenerator::new(&arm, &detector, marker(), &companion, SEED)
            .with_max_attempts(0);
        let configurations = generator.generate(0, &mut StdRng::seed_from_u64(5)).expect("nothing to do");
        assert!(configurations.is_empty());
    }

    #[test]
    fn test_empty_companion_trajectory() {
        let arm = PointArm::new(5.0);
        let detector = DiscDetector { radius: 0.01 };
        let generator = ConfigurationGenerator::new(&arm, &detector, marker(), &[], SEED);
        assert!(matches!(generator.generate(1, &mut StdRng::seed_from_u64(1)),
            Err(SamplingError::EmptyCompanionTrajectory)));
    }

    #[test]
    fn test_tip_off_paper_is_rejected() {
        let arm = PointArm { reach: 5.0, shift: 1.0 };
        let detector = DiscDetector { radius: 0.01 };
        let companion = vec![companion_at(3.0, 3.0)];
        let generator = ConfigurationGenerator::new(&arm, &detector, marker(), &companion, SEED);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(generator.attempt(&mut rng), Err(Rejection::OutOfRegion));
        }
    }

    #[test]
    fn test_collision_reports_first_colliding_companion_pose() {
        let arm = PointArm::new(5.0);
        // Large enough to cover the paper from its center
        let detector = DiscDetector { radius: 0.5 };
        let companion = vec![companion_at(5.0, 5.0), companion_at(0.0, 0.0), companion_at(0.01, 0.0)];
        let generator = ConfigurationGenerator::new(&arm, &detector, aligned_marker(), &companion, SEED);
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..20 {
            assert_eq!(generator.attempt(&mut rng), Err(Rejection::Collision { companion_index: 1 }));
        }
    }

    #[test]
    fn test_exclusion_footprint() {
        let arm = PointArm::new(5.0);
        let detector = DiscDetector { radius: 0.01 };
        let companion = vec![companion_at(3.0, 3.0)];
        let frame = marker();
        // Excluding the whole paper leaves nothing
        let generator = ConfigurationGenerator::new(&arm, &detector, frame, &companion, SEED)
            .with_exclusion(RegionPolygon::paper(&frame));
        let mut rng = StdRng::seed_from_u64(21);
        let mut excluded = 0;
        for _ in 0..20 {
            match generator.attempt(&mut rng) {
                Err(Rejection::InsideExclusion) => excluded += 1,
                Err(Rejection::OutOfRegion) => {}
                other => panic!("Unexpected outcome {:?}", other),
            }
        }
        assert!(excluded > 0);
    }
}
