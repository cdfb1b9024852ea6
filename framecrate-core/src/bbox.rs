//! Oriented 3D bounding boxes
//!
//! A [`BoxRecord`] is the raw annotation row (center, half extents, yaw).
//! [`reconstruct`] turns it into the eight corner points consumed by the line
//! renderer; [`BOX_EDGES`] is the matching edge topology. Both orderings are
//! fixed because the renderer addresses corners by index.

use crate::error::{Error, Result};
use crate::point::{Point3d, Rgb, Vector3d};
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Corner sign pattern: bottom face (-z) counter-clockwise, then top face (+z).
const CORNER_SIGNS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Edge topology of a reconstructed box: bottom ring, top ring, verticals.
pub const BOX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// One bounding box annotation, as produced by the box readers.
///
/// `frame_id` is signed so that readers can hand over whatever the source
/// file contains; [`crate::FrameIndex::build`] rejects negative ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub frame_id: i64,
    pub center: Point3d,
    pub half_extent: Vector3d,
    /// Yaw about +Z, in radians.
    pub heading: f64,
}

impl BoxRecord {
    pub fn new(frame_id: i64, center: Point3d, half_extent: Vector3d, heading: f64) -> Self {
        Self {
            frame_id,
            center,
            half_extent,
            heading,
        }
    }

    /// Build a record from full box dimensions (the usual annotation format).
    pub fn from_dimensions(frame_id: i64, center: Point3d, dimensions: Vector3d, heading: f64) -> Self {
        Self::new(frame_id, center, dimensions / 2.0, heading)
    }

    /// Check the geometric fields, returning a description of the first problem.
    pub fn validate(&self) -> std::result::Result<(), String> {
        validate_geometry(&self.center, &self.half_extent, self.heading)
    }
}

fn validate_geometry(center: &Point3d, half_extent: &Vector3d, heading: f64) -> std::result::Result<(), String> {
    if !center.iter().all(|c| c.is_finite()) {
        return Err(format!("center {:?} is not finite", center.coords.as_slice()));
    }
    if !half_extent.iter().all(|c| c.is_finite()) {
        return Err(format!("half extent {:?} is not finite", half_extent.as_slice()));
    }
    if half_extent.iter().any(|c| *c < 0.0) {
        return Err(format!("half extent {:?} is negative", half_extent.as_slice()));
    }
    if !heading.is_finite() {
        return Err(format!("heading {heading} is not finite"));
    }
    Ok(())
}

/// Reconstruct the eight corners of an oriented box.
///
/// Corners of the axis-aligned box `±half_extent` are rotated about +Z by
/// `heading` radians and translated to `center`.
pub fn reconstruct(center: Point3d, half_extent: Vector3d, heading: f64) -> Result<[Point3d; 8]> {
    validate_geometry(&center, &half_extent, heading).map_err(Error::InvalidData)?;

    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), heading);
    Ok(CORNER_SIGNS.map(|[sx, sy, sz]| {
        let local = Vector3::new(sx * half_extent.x, sy * half_extent.y, sz * half_extent.z);
        center + rotation * local
    }))
}

/// Drawable box: eight ordered corners sharing [`BOX_EDGES`].
///
/// Built fresh for every presented frame and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBoxGeometry {
    pub corners: [Point3d; 8],
}

impl OrientedBoxGeometry {
    pub fn from_record(record: &BoxRecord) -> Result<Self> {
        let corners = reconstruct(record.center, record.half_extent, record.heading)?;
        Ok(Self { corners })
    }

    pub fn edges(&self) -> &'static [[usize; 2]; 12] {
        &BOX_EDGES
    }

    /// Convert to a line set with a uniform color.
    pub fn to_line_set(&self, color: Rgb) -> LineSet {
        LineSet {
            points: self.corners.to_vec(),
            lines: BOX_EDGES.to_vec(),
            color,
        }
    }
}

/// Indexed line geometry handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct LineSet {
    pub points: Vec<Point3d>,
    pub lines: Vec<[usize; 2]>,
    pub color: Rgb,
}

impl LineSet {
    pub fn segment_count(&self) -> usize {
        self.lines.len()
    }

    /// Endpoints of one segment
    pub fn segment(&self, index: usize) -> Option<(Point3d, Point3d)> {
        let [a, b] = *self.lines.get(index)?;
        Some((*self.points.get(a)?, *self.points.get(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn origin() -> Point3d {
        Point3d::origin()
    }

    #[test]
    fn test_axis_aligned_corner_order() {
        let corners = reconstruct(origin(), Vector3d::new(1.0, 2.0, 3.0), 0.0).unwrap();
        let expected = [
            [-1.0, -2.0, -3.0],
            [1.0, -2.0, -3.0],
            [1.0, 2.0, -3.0],
            [-1.0, 2.0, -3.0],
            [-1.0, -2.0, 3.0],
            [1.0, -2.0, 3.0],
            [1.0, 2.0, 3.0],
            [-1.0, 2.0, 3.0],
        ];
        for (corner, [x, y, z]) in corners.iter().zip(expected) {
            assert_relative_eq!(*corner, Point3d::new(x, y, z));
        }
    }

    #[test]
    fn test_unit_box_distances_and_centroid() {
        let steps = 64;
        for i in 0..steps {
            let heading = 2.0 * PI * i as f64 / steps as f64;
            let corners = reconstruct(origin(), Vector3d::new(1.0, 1.0, 1.0), heading).unwrap();

            let mut sum = Vector3d::zeros();
            for corner in &corners {
                assert_relative_eq!(corner.coords.norm(), 3.0_f64.sqrt(), epsilon = 1e-12);
                sum += corner.coords;
            }
            assert_relative_eq!(sum / 8.0, Vector3d::zeros(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quarter_turn_maps_x_to_y() {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        assert_relative_eq!(rotation * Vector3d::x(), Vector3d::y(), epsilon = 1e-12);

        // corner (+,-,-) of a unit box ends up at (+,+,-) after a quarter turn
        let corners = reconstruct(origin(), Vector3d::new(1.0, 1.0, 1.0), FRAC_PI_2).unwrap();
        assert_relative_eq!(corners[1], Point3d::new(1.0, 1.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_heading_is_radians() {
        // 1 rad must not be treated as 57.3 rad
        let corners = reconstruct(origin(), Vector3d::new(1.0, 0.0, 0.0), 1.0).unwrap();
        assert_relative_eq!(corners[1], Point3d::new(1.0_f64.cos(), 1.0_f64.sin(), 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_translation_applied_after_rotation() {
        let center = Point3d::new(10.0, -5.0, 2.0);
        let corners = reconstruct(center, Vector3d::new(2.0, 1.0, 0.5), 0.3).unwrap();
        let centroid = corners.iter().fold(Vector3d::zeros(), |acc, p| acc + p.coords) / 8.0;
        assert_relative_eq!(centroid, center.coords, epsilon = 1e-12);
        assert_relative_eq!(corners[0].z, 1.5);
        assert_relative_eq!(corners[4].z, 2.5);
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let half = Vector3d::new(1.0, 1.0, 1.0);
        assert!(reconstruct(Point3d::new(f64::NAN, 0.0, 0.0), half, 0.0).is_err());
        assert!(reconstruct(origin(), Vector3d::new(1.0, f64::INFINITY, 1.0), 0.0).is_err());
        assert!(reconstruct(origin(), half, f64::NAN).is_err());
        assert!(reconstruct(origin(), Vector3d::new(-1.0, 1.0, 1.0), 0.0).is_err());
    }

    #[test]
    fn test_from_dimensions_halves_sizes() {
        let record = BoxRecord::from_dimensions(0, origin(), Vector3d::new(4.0, 2.0, 1.0), 0.0);
        assert_eq!(record.half_extent, Vector3d::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn test_line_set_topology() {
        let record = BoxRecord::new(0, origin(), Vector3d::new(1.0, 1.0, 1.0), 0.0);
        let geometry = OrientedBoxGeometry::from_record(&record).unwrap();
        let lines = geometry.to_line_set([1.0, 1.0, 0.0]);

        assert_eq!(lines.points.len(), 8);
        assert_eq!(lines.segment_count(), 12);
        assert_eq!(lines.lines, BOX_EDGES.to_vec());

        // every edge of an axis-aligned unit box has length 2
        for i in 0..lines.segment_count() {
            let (a, b) = lines.segment(i).unwrap();
            assert_relative_eq!((b - a).norm(), 2.0);
        }
        assert!(lines.segment(12).is_none());
    }
}
