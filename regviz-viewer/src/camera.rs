//! Orbit camera for the viewer windows

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use regviz_core::Point3f;

/// A 3D orbit camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    home_position: Point3<f32>,
    home_target: Point3<f32>,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
            home_position: position,
            home_target: target,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far).into_inner()
    }

    /// Rotate the camera around the target
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius < f32::EPSILON {
            return;
        }

        let mut theta = offset.z.atan2(offset.x);
        let mut phi = (offset.y / radius).asin();
        theta -= yaw;
        phi = (phi + pitch).clamp(-1.5, 1.5);

        let offset = Vector3::new(
            radius * phi.cos() * theta.cos(),
            radius * phi.sin(),
            radius * phi.cos() * theta.sin(),
        );
        self.position = self.target + offset;
    }

    /// Move the camera toward or away from the target
    pub fn zoom(&mut self, amount: f32) {
        let offset = self.position - self.target;
        let radius = (offset.norm() * (1.0 - amount)).max(self.near * 2.0);
        self.position = self.target + offset.normalize() * radius;
    }

    /// Return to the home viewpoint
    pub fn reset(&mut self) {
        self.position = self.home_position;
        self.target = self.home_target;
    }

    /// Re-home the camera so the given bounds fill the view
    pub fn frame_bounds(&mut self, min: Point3f, max: Point3f) {
        let center = Point3::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        );
        let extent = ((max - min).norm()).max(1.0);

        let direction = (self.position - self.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vector3::new(1.0, 1.0, 1.0).normalize());

        self.target = center;
        self.position = center + direction * extent * 1.5;
        self.home_position = self.position;
        self.home_target = self.target;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(30.0, 30.0, 30.0), Point3::origin())
    }
}
