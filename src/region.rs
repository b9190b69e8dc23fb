//! Planar regions on the table: the sheet of paper and the gripper footprint.

use nalgebra::{Point2, Point3, Vector3};
use crate::frame::MarkerFrame;
use crate::kinematic_traits::Pose;

/// Height of the table surface carrying the paper, meters.
pub const TABLE_HEIGHT: f64 = 0.71;

/// Half of the paper width (along the marker x axis), meters.
pub const PAPER_HALF_WIDTH: f64 = 0.105;

/// Half of the paper length (along the marker y axis), meters.
pub const PAPER_HALF_LENGTH: f64 = 0.145;

/// Half extents of the gripper fingers rectangle projected on the table, meters.
const GRIPPER_HALF_X: f64 = 0.04;
const GRIPPER_HALF_Y: f64 = 0.08;

/// Quadrilateral on the table in world coordinates. Vertices follow the boundary in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPolygon {
    pub vertices: [Point3<f64>; 4],
}

impl RegionPolygon {
    /// Region from corners given relative to the marker, placed at the given height.
    pub fn from_marker_offsets(frame: &MarkerFrame, offsets: &[(f64, f64); 4], height: f64) -> Self {
        let vertices = offsets.map(|(x, y)| {
            let world = frame.to_world(&Point2::new(x, y));
            Point3::new(world.x, world.y, height)
        });
        RegionPolygon { vertices }
    }

    /// The paper sheet as localized by the marker. Corner coordinates are snapped to
    /// millimetres, as they would be reported by the perception pipeline.
    pub fn paper(frame: &MarkerFrame) -> Self {
        let offsets = [
            (PAPER_HALF_WIDTH, PAPER_HALF_LENGTH),
            (PAPER_HALF_WIDTH, -PAPER_HALF_LENGTH),
            (-PAPER_HALF_WIDTH, -PAPER_HALF_LENGTH),
            (-PAPER_HALF_WIDTH, PAPER_HALF_LENGTH),
        ];
        let exact = Self::from_marker_offsets(frame, &offsets, TABLE_HEIGHT);
        RegionPolygon {
            vertices: exact.vertices.map(|v| Point3::new(round_mm(v.x), round_mm(v.y), v.z)),
        }
    }

    /// Rectangle covered by the gripper fingers when the gripper is at the given pose.
    /// The rectangle is spanned by the horizontal projections of the tool x and y axes.
    /// Returns None if the tool axes are (nearly) vertical and have no usable projection.
    pub fn gripper_footprint(center: &Pose) -> Option<Self> {
        let c = center.translation.vector;
        let x_axis = flatten(center.rotation * Vector3::x())?;
        let y_axis = flatten(center.rotation * Vector3::y())?;
        let corner = |sx: f64, sy: f64| -> Point3<f64> {
            Point3::from(c + sx * GRIPPER_HALF_X * x_axis + sy * GRIPPER_HALF_Y * y_axis)
        };
        Some(RegionPolygon {
            vertices: [
                corner(1.0, 1.0),
                corner(1.0, -1.0),
                corner(-1.0, -1.0),
                corner(-1.0, 1.0),
            ],
        })
    }

    /// True if the point (x, y) is strictly inside the polygon. Points on the boundary are
    /// outside. Height is ignored.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            if on_segment(a, b, x, y) {
                return false;
            }
            // Crossing number: count edges crossing the horizontal ray to the right
            if (a.y > y) != (b.y > y) {
                let crossing_x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                if x < crossing_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Average of the vertices.
    pub fn centroid(&self) -> Point3<f64> {
        let sum = self.vertices.iter().fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Area of the polygon (shoelace formula over x and y).
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = &self.vertices[i];
                let b = &self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() / 2.0
    }
}

fn round_mm(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Horizontal projection of the axis, normalized.
fn flatten(axis: Vector3<f64>) -> Option<Vector3<f64>> {
    Vector3::new(axis.x, axis.y, 0.0).try_normalize(1E-9)
}

fn on_segment(a: &Point3<f64>, b: &Point3<f64>, x: f64, y: f64) -> bool {
    const EPSILON: f64 = 1E-12;
    let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
    if cross.abs() > EPSILON {
        return false;
    }
    x >= a.x.min(b.x) - EPSILON && x <= a.x.max(b.x) + EPSILON
        && y >= a.y.min(b.y) - EPSILON && y <= a.y.max(b.y) + EPSILON
}
