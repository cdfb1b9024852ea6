//! Point types and related functionality

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates, used for decoded point clouds
pub type Point3f = Point3<f32>;

/// A 3D point with double precision coordinates, used for box geometry
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// An RGB color with components in `[0, 1]`
pub type Rgb = [f32; 3];

/// A point with color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint3f {
    pub position: Point3f,
    pub color: [u8; 3],
}

impl ColoredPoint3f {
    pub fn new(position: Point3f, color: [u8; 3]) -> Self {
        Self { position, color }
    }
}

impl Default for ColoredPoint3f {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            color: [255, 255, 255],
        }
    }
}

impl From<ColoredPoint3f> for Point3f {
    fn from(point: ColoredPoint3f) -> Self {
        point.position
    }
}
