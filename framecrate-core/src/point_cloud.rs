//! Point cloud data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A generic point cloud container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with 3D points
pub type PointCloud3f = PointCloud<Point3f>;

/// A point cloud with colored points
pub type ColoredPointCloud3f = PointCloud<ColoredPoint3f>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl PointCloud<Point3f> {
    /// Paint every point with one color, as the viewer does for raw scans
    pub fn paint_uniform_color(&self, color: [u8; 3]) -> PointCloud<ColoredPoint3f> {
        self.iter()
            .map(|p| ColoredPoint3f::new(*p, color))
            .collect()
    }
}

impl<T> PointCloud<T>
where
    T: Copy,
    Point3f: From<T>,
{
    /// Axis-aligned bounds of the cloud, `None` when empty
    pub fn bounds(&self) -> Option<(Point3f, Point3f)> {
        let mut iter = self.points.iter().map(|p| Point3f::from(*p));
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Some((min, max))
    }

    /// Center of the axis-aligned bounds, used to aim the camera
    pub fn center(&self) -> Option<Point3f> {
        self.bounds().map(|(min, max)| nalgebra::center(&min, &max))
    }
}
