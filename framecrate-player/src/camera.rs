//! Camera utilities for picking points in the 3D view

use nalgebra::{Matrix4, Perspective3, Point3, Vector3, Vector4};

/// Window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// A perspective camera looking at the scene
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view, radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Frame an axis-aligned region with a 60 degree view.
    ///
    /// The camera sits on the -Z side of the region's center with -Y up,
    /// which shows sensor-frame scans the right way round.
    pub fn framing(min: Point3<f32>, max: Point3<f32>, aspect_ratio: f32) -> Self {
        let fov = 60f32.to_radians();
        let center = nalgebra::center(&min, &max);
        let radius = ((max - min).norm() * 0.5).max(1.0);
        let distance = radius / (fov * 0.5).tan() + radius;

        Self::new(
            center - Vector3::new(0.0, 0.0, distance),
            center,
            Vector3::new(0.0, -1.0, 0.0),
            fov,
            aspect_ratio,
            0.1,
            distance + radius * 4.0,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far).into_inner()
    }

    fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Window coordinates and depth of a world point.
    ///
    /// `x` and `y` are pixels from the top-left corner, depth is in `[0, 1]`.
    /// Points behind the camera give `None`.
    pub fn project(&self, point: &Point3<f32>, viewport: Viewport) -> Option<(f32, f32, f32)> {
        let clip = self.view_projection() * point.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;
        let depth = (ndc.z + 1.0) * 0.5;
        Some((x, y, depth))
    }

    /// World point under window pixel `(x, y)` at depth-buffer value `depth`.
    ///
    /// A depth of 1.0 is the far plane, meaning nothing was hit; that and a
    /// degenerate camera give `None`.
    pub fn unproject(&self, x: f32, y: f32, depth: f32, viewport: Viewport) -> Option<Point3<f32>> {
        if !(0.0..1.0).contains(&depth) || viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let inverse = self.view_projection().try_inverse()?;
        let ndc = Vector4::new(
            2.0 * x / viewport.width as f32 - 1.0,
            1.0 - 2.0 * y / viewport.height as f32,
            2.0 * depth - 1.0,
            1.0,
        );
        let world = inverse * ndc;
        if world.w.abs() <= f32::EPSILON {
            return None;
        }
        Some(Point3::from(world.xyz() / world.w))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}
