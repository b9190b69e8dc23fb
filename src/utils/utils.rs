//! Helper functions

use crate::kinematic_traits::{Configuration, Joints, Solutions};
use nalgebra::{Isometry3, UnitQuaternion};
use std::f64::consts::PI;

/// Checks the solution for validity. This is only internally needed as all returned
/// solutions are already checked.
pub(crate) mod dh_kinematics {
    use crate::kinematic_traits::Joints;

    /// Checks if all elements in the array are finite
    pub fn is_valid(qs: &Joints) -> bool {
        qs.iter().all(|&q| q.is_finite())
    }
}

/// Bring the angle into the range (-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let wrapped = angle.rem_euclid(two_pi);
    if wrapped > PI { wrapped - two_pi } else { wrapped }
}

/// Euclidean distance in the joint space.
pub fn joint_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Convert joints that are array of f64's in radians to
/// array of f32's in degrees
pub fn to_degrees(angles: &Configuration) -> [f32; 7] {
    angles.map(|a| a.to_degrees() as f32)
}

/// Print joint values for all solutions, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_solutions(solutions: &Solutions) {
    if solutions.is_empty() {
        println!("No solutions");
    }
    for solution in solutions {
        dump_joints(solution);
    }
}

/// Print joint values, converting radians to degrees.
#[allow(dead_code)]
pub fn dump_joints(joints: &Joints) {
    println!("[{}]", format_angles(joints));
}

/// Print configuration values including the tip joint, converting radians to degrees.
pub fn dump_configuration(configuration: &Configuration) {
    println!("[{}]", format_angles(configuration));
}

fn format_angles(angles: &[f64]) -> String {
    let mut row_str = String::new();
    for angle in angles {
        row_str.push_str(&format!("{:7.2} ", angle.to_degrees()));
    }
    row_str.trim_end().to_string()
}

pub fn dump_pose(isometry: &Isometry3<f64>) {
    let translation = isometry.translation.vector;
    let rotation: UnitQuaternion<f64> = isometry.rotation;
    println!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    );
}

/// formatting for YAML output
pub(crate) fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:.4})", x.to_degrees())
}

/// Compare two poses with the given tolerance.
pub fn poses_close(ta: &Isometry3<f64>, tb: &Isometry3<f64>,
                   distance_tolerance: f64, angular_tolerance: f64) -> bool {
    let translation_distance = (ta.translation.vector - tb.translation.vector).norm();
    let angular_distance = ta.rotation.angle_to(&tb.rotation);
    translation_distance <= distance_tolerance && angular_distance <= angular_tolerance
}

pub fn assert_pose_eq(ta: &Isometry3<f64>, tb: &Isometry3<f64>,
                      distance_tolerance: f64, angular_tolerance: f64) -> bool {
    if !poses_close(ta, tb, distance_tolerance, angular_tolerance) {
        dump_pose(ta);
        dump_pose(tb);
        panic!("Poses are too different");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::dh_kinematics::*;
    use super::*;

    #[test]
    fn test_is_valid_with_all_finite() {
        let qs = [0.0, 1.0, -1.0, 0.5, -0.5, PI];
        assert!(is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_nan() {
        let qs = [0.0, f64::NAN, 1.0, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI + 0.5) - (0.5 - PI)).abs() < 1E-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1E-12);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1E-12);
        assert!((normalize_angle(2.0 * PI + 0.25) - 0.25).abs() < 1E-12);
    }

    #[test]
    fn test_to_degrees() {
        let configuration: Configuration = [10.0, -20.0, 30.0, -40.0, 50.0, -60.0, 90.0]
            .map(f64::to_radians);
        let degrees = to_degrees(&configuration);
        assert!((degrees[6] - 90.0).abs() < 1E-4);
        assert!((degrees[1] + 20.0).abs() < 1E-4);
    }
}
