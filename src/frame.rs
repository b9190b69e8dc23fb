//! Supports the marker frame that localizes the work surface.
//! The fiducial marker glued to the table is detected once per run; its position and planar
//! rotation define where the paper is. Offsets expressed relative to the marker (sampled
//! grasp points, paper corners) are mapped into the world with this frame.

use nalgebra::{Isometry2, Matrix2, Point2, Rotation2, Translation2, UnitComplex, Vector2, Vector3};
use std::error::Error;
use std::fmt;

/// Tolerance how much the rotation matrix reported by perception may deviate from an
/// orthonormal one before it is rejected.
const NON_ROTATION_TOLERANCE: f64 = 0.01;

/// Position and planar rotation of the marker. Immutable within a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFrame {
    /// Position of the marker in world coordinates. Only x and y take part in planar
    /// transforms, z is the height of the marker.
    pub position: Vector3<f64>,

    /// Rotation of the marker around the vertical axis.
    pub rotation: Rotation2<f64>,
}

impl MarkerFrame {
    pub fn new(position: Vector3<f64>, rotation: Rotation2<f64>) -> Self {
        MarkerFrame { position, rotation }
    }

    /// Marker at the world origin, not rotated.
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Rotation2::identity())
    }

    /// Marker rotated by the given angle (radians) around the vertical axis.
    pub fn from_yaw(position: Vector3<f64>, yaw: f64) -> Self {
        Self::new(position, Rotation2::new(yaw))
    }

    /// Marker from the 2x2 rotation matrix as reported by marker pose estimation.
    /// The matrix must be orthonormal with positive determinant within a small tolerance.
    /// The nearest exact rotation (polar decomposition, the angle maximizing `trace(Rᵀ·M)`)
    /// is used, so all four entries contribute.
    pub fn from_matrix(position: Vector3<f64>, matrix: Matrix2<f64>) -> Result<Self, NotRotation> {
        let gram = matrix.transpose() * matrix;
        let deviation = (gram - Matrix2::identity()).abs().max();
        if !deviation.is_finite() || deviation > NON_ROTATION_TOLERANCE || matrix.determinant() <= 0.0 {
            return Err(NotRotation { matrix });
        }
        let angle = (matrix[(1, 0)] - matrix[(0, 1)]).atan2(matrix[(0, 0)] + matrix[(1, 1)]);
        Ok(Self::new(position, Rotation2::new(angle)))
    }

    /// Rotation angle around the vertical axis, radians.
    pub fn yaw(&self) -> f64 {
        self.rotation.angle()
    }

    /// Map point given in marker coordinates into the world: `R * p + position`.
    pub fn to_world(&self, point: &Point2<f64>) -> Point2<f64> {
        self.isometry().transform_point(point)
    }

    /// Map world point into marker coordinates: `R^T * (p - position)`.
    pub fn to_marker(&self, point: &Point2<f64>) -> Point2<f64> {
        self.isometry().inverse_transform_point(point)
    }

    /// Planar isometry of the marker.
    pub fn isometry(&self) -> Isometry2<f64> {
        let translation = Translation2::from(Vector2::new(self.position.x, self.position.y));
        Isometry2::from_parts(translation, UnitComplex::from_rotation_matrix(&self.rotation))
    }
}

/// Perception reported a matrix that is not a rotation.
#[derive(Debug)]
pub struct NotRotation {
    pub matrix: Matrix2<f64>,
}

impl fmt::Display for NotRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marker rotation is not a proper rotation matrix: [[{:.4}, {:.4}], [{:.4}, {:.4}]]",
               self.matrix[(0, 0)], self.matrix[(0, 1)], self.matrix[(1, 0)], self.matrix[(1, 1)])
    }
}

impl Error for NotRotation {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_round_trip() {
        let frame = MarkerFrame::from_yaw(Vector3::new(0.12, -0.3, 0.71), 0.7);
        for (x, y) in [(0.0, 0.0), (0.105, 0.145), (-0.05, 0.02), (1.5, -2.25)] {
            let point = Point2::new(x, y);
            let back = frame.to_marker(&frame.to_world(&point));
            assert!((back - point).norm() < 1E-12, "{} != {}", back, point);
        }
    }

    #[test]
    fn test_rotation_then_translation() {
        let frame = MarkerFrame::from_yaw(Vector3::new(1.0, 2.0, 0.0), PI / 2.0);
        let world = frame.to_world(&Point2::new(1.0, 0.0));
        assert!((world - Point2::new(1.0, 3.0)).norm() < 1E-12);
    }

    #[test]
    fn test_from_matrix() {
        let angle: f64 = -0.4;
        let matrix = Matrix2::new(angle.cos(), -angle.sin(), angle.sin(), angle.cos());
        let frame = MarkerFrame::from_matrix(Vector3::zeros(), matrix).expect("valid rotation");
        assert!((frame.yaw() - angle).abs() < 1E-12);

        // Mirroring is not a rotation
        let mirror = Matrix2::new(1.0, 0.0, 0.0, -1.0);
        assert!(MarkerFrame::from_matrix(Vector3::zeros(), mirror).is_err());

        // Uniform scaling within tolerance keeps the angle
        let noisy = matrix * 1.004;
        let frame = MarkerFrame::from_matrix(Vector3::zeros(), noisy).expect("within tolerance");
        assert!((frame.yaw() - angle).abs() < 1E-12);

        // Larger scaling is rejected
        let scaled = Matrix2::new(1.2, 0.0, 0.0, 1.2);
        assert!(MarkerFrame::from_matrix(Vector3::zeros(), scaled).is_err());
    }

    #[test]
    fn test_from_matrix_uses_nearest_rotation() {
        // Shear from perception noise: the first column alone would say "not rotated"
        let sheared = Matrix2::new(1.0, 0.009, 0.0, 1.0);
        let frame = MarkerFrame::from_matrix(Vector3::zeros(), sheared).expect("within tolerance");
        let expected = (-0.009_f64).atan2(2.0);
        assert!((frame.yaw() - expected).abs() < 1E-12, "yaw {}", frame.yaw());

        // The corner moves towards where the raw matrix puts it
        let corner = Point2::new(0.105, 0.145);
        let raw = sheared * corner.coords;
        let world = frame.to_world(&corner);
        assert!((world.x - raw.x).abs() < (corner.x - raw.x).abs());
    }
}
