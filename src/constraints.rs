use std::f64::consts::PI;
use std::ops::RangeInclusive;
use rand::Rng;

/// Joint limits. `N` is 6 for the arm joints used by kinematics and 7 for the full
/// configuration (arm joints and the tip joint) used by the planner.
#[derive(Clone, Debug)]
pub struct Constraints<const N: usize = 6> {
    /// Normalized lower limit. If more than upper limit, the range wraps-around through 0
    pub from: [f64; N],

    /// Normalized upper limit. If less than lower limit, the range wraps-around through 0
    pub to: [f64; N],
}

impl<const N: usize> Constraints<N> {
    pub fn new(from: [f64; N], to: [f64; N]) -> Self {
        let two_pi = 2.0 * PI;
        let from_normalized: [f64; N] = from.map(|f| ((f % two_pi) + two_pi) % two_pi);
        let to_normalized: [f64; N] = to.map(|t| ((t % two_pi) + two_pi) % two_pi);

        Constraints {
            from: from_normalized,
            to: to_normalized,
        }
    }

    /// Joints without limits (every joint may take any angle).
    pub fn unconstrained() -> Self {
        Self::new([0.0; N], [0.0; N])
    }

    /// Limits given as inclusive ranges in degrees.
    pub fn from_degrees(ranges: [RangeInclusive<f64>; N]) -> Self {
        let from = std::array::from_fn(|i| ranges[i].start().to_radians());
        let to = std::array::from_fn(|i| ranges[i].end().to_radians());
        Self::new(from, to)
    }

    pub fn compliant(&self, angles: &[f64; N]) -> bool {
        let two_pi = 2.0 * PI;
        for i in 0..N {
            if self.from[i] == self.to[i] {
                continue; // Joint without constraints, from == to
            }
            let angle = ((angles[i] % two_pi) + two_pi) % two_pi;
            if self.from[i] <= self.to[i] {
                if !(angle >= self.from[i] && angle <= self.to[i]) {
                    return false;
                }
            } else if !(angle >= self.from[i] || angle <= self.to[i]) {
                return false;
            }
        }
        true
    }

    pub fn filter(&self, angles: &[[f64; N]]) -> Vec<[f64; N]> {
        angles.iter()
            .filter(|angle_array| self.compliant(angle_array))
            .cloned()
            .collect()
    }

    /// Random angles within the limits, each in (-PI, PI]. Unconstrained joints are
    /// sampled over the full circle.
    pub fn random_angles<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; N] {
        let two_pi = 2.0 * PI;
        std::array::from_fn(|i| {
            let (from, to) = (self.from[i], self.to[i]);
            let span = if from == to {
                two_pi
            } else if from < to {
                to - from
            } else {
                to + two_pi - from
            };
            let angle = from + rng.gen_range(0.0..=span);
            crate::utils::normalize_angle(angle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_no_wrap_around() {
        let angles = [0.1 * PI, 0.2 * PI, 0.3 * PI, 0.4 * PI, 0.5 * PI, 0.6 * PI];
        let from = [0.0, 0.15 * PI, 0.25 * PI, 0.35 * PI, 0.45 * PI, 0.55 * PI];
        let to = [0.2 * PI, 0.3 * PI, 0.4 * PI, 0.5 * PI, 0.6 * PI, 0.7 * PI];
        let limits = Constraints::new(from, to);
        assert!(limits.compliant(&angles));
    }

    #[test]
    fn test_with_wrap_around() {
        let angles = [0.9 * PI, 1.9 * PI, 0.05 * PI, 1.05 * PI, 1.95 * PI, 0.95 * PI];
        let from = [0.8 * PI, 1.8 * PI, 0.0, 1.0 * PI, 1.9 * PI, 0.9 * PI];
        let to = [0.1 * PI, 1.1 * PI, 0.2 * PI, 1.2 * PI, 0.0, 1.0 * PI];
        let limits = Constraints::new(from, to);
        assert!(limits.compliant(&angles));
    }

    #[test]
    fn test_invalid_angles_no_wrap_around() {
        let angles = [0.15 * PI, 0.25 * PI, 0.55 * PI, 0.65 * PI, 0.75 * PI, 0.85 * PI];
        let from = [0.2 * PI, 0.3 * PI, 0.6 * PI, 0.7 * PI, 0.8 * PI, 0.9 * PI];
        let to = [0.1 * PI, 0.2 * PI, 0.5 * PI, 0.6 * PI, 0.7 * PI, 0.8 * PI];
        let limits = Constraints::new(from, to);
        assert!(!limits.compliant(&angles));
    }

    #[test]
    fn test_filter_seven_joints() {
        let limits = Constraints::<7>::from_degrees([
            0.0..=90.0, 0.0..=90.0, 0.0..=90.0, 0.0..=90.0, 0.0..=90.0, 0.0..=90.0, 0.0..=90.0,
        ]);
        let angles = vec![
            [PI / 3.0, PI / 4.0, PI / 6.0, PI / 3.0, PI / 4.0, PI / 6.0, 0.1], // Should be retained
            [PI / 3.0, PI / 4.0, PI / 6.0, PI / 3.0, PI / 4.0, PI / 6.0, PI], // Should be removed
        ];
        let filtered = limits.filter(&angles);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0][6], 0.1);
    }

    #[test]
    fn test_random_angles_are_compliant() {
        let mut rng = StdRng::seed_from_u64(11);
        let limits = Constraints::from_degrees([
            -10.0..=10.0, 170.0..=-170.0, 0.0..=45.0, -90.0..=0.0, 0.0..=0.0, 30.0..=60.0,
        ]);
        for _ in 0..500 {
            let angles = limits.random_angles(&mut rng);
            assert!(limits.compliant(&angles), "Not compliant: {:?}", angles);
            assert!(angles.iter().all(|a| *a > -PI && *a <= PI));
        }
    }
}
