//! Rigid pose utilities
//!
//! A `Pose` is the rigid transform estimated by the registration pipeline for
//! one frame: it maps sensor/ego coordinates into the global frame. The
//! rotation block is expected to be orthonormal; `try_from_matrix` enforces
//! that, while `from_matrix_unchecked` trusts the caller.

use crate::error::Error;
use crate::point::{Point3f, Vector3f};
use nalgebra::{Isometry3, Matrix3, Matrix4, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A rigid 3D transformation (rotation + translation) stored as a 4x4 matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    matrix: Matrix4<f32>,
}

impl Pose {
    const RIGIDITY_EPS: f32 = 1e-4;

    /// The identity pose
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a pure translation pose
    pub fn from_translation(translation: Vector3f) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a pose from translation and rotation
    pub fn from_parts(translation: Vector3f, rotation: UnitQuaternion<f32>) -> Self {
        let isometry = Isometry3::from_parts(translation.into(), rotation);
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }

    /// Create a pose from a 4x4 matrix, validating that it is rigid
    ///
    /// The rotation block must be orthonormal with determinant +1 and the
    /// bottom row must be `[0, 0, 0, 1]`.
    pub fn try_from_matrix(matrix: Matrix4<f32>) -> Result<Self, Error> {
        let pose = Self { matrix };
        if !pose.is_rigid(Self::RIGIDITY_EPS) {
            return Err(Error::InvalidData(
                "pose matrix is not a rigid transform".to_string(),
            ));
        }
        Ok(pose)
    }

    /// Create a pose from a 4x4 matrix without validation
    pub fn from_matrix_unchecked(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }

    /// The underlying homogeneous matrix
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// The rotation block of the pose
    pub fn rotation(&self) -> Matrix3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation component of the pose
    pub fn translation(&self) -> Vector3f {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// The translation component as a point (one trajectory entry)
    pub fn position(&self) -> Point3f {
        self.translation().into()
    }

    /// Closed-form rigid inverse: `R^T` and `-R^T t`
    pub fn inverse(&self) -> Self {
        let rot_t = self.rotation().transpose();
        let t = self.translation();
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&rot_t);
        matrix
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&(-rot_t * t));
        Self { matrix }
    }

    /// Apply the pose to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3f::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Check whether the matrix encodes a rigid transform
    pub fn is_rigid(&self, epsilon: f32) -> bool {
        let rot = self.rotation();
        let orthonormal = (rot.transpose() * rot - Matrix3::identity()).norm() < epsilon;
        let proper = (rot.determinant() - 1.0).abs() < epsilon;
        let affine = (self.matrix.row(3)
            - nalgebra::RowVector4::new(0.0, 0.0, 0.0, 1.0))
        .norm()
            < epsilon;
        orthonormal && proper && affine
    }

    /// Check if this is approximately the identity pose
    pub fn is_identity(&self, epsilon: f32) -> bool {
        (self.matrix - Matrix4::identity()).norm() < epsilon
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Pose {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

impl From<Isometry3<f32>> for Pose {
    fn from(isometry: Isometry3<f32>) -> Self {
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translation_roundtrip() {
        let pose = Pose::from_translation(Vector3f::new(1.0, 2.0, 3.0));
        assert_relative_eq!(pose.translation().x, 1.0);
        assert_relative_eq!(pose.translation().y, 2.0);
        assert_relative_eq!(pose.translation().z, 3.0);
    }

    #[test]
    fn test_rigid_inverse_cancels() {
        let rotation = UnitQuaternion::from_euler_angles(0.3, -0.2, 0.8);
        let pose = Pose::from_parts(Vector3f::new(4.0, -1.0, 2.5), rotation);
        let composed = pose * pose.inverse();
        assert!(composed.is_identity(1e-4));
    }

    #[test]
    fn test_try_from_matrix_rejects_scaling() {
        let mut matrix = Matrix4::identity();
        matrix[(0, 0)] = 2.0;
        assert!(Pose::try_from_matrix(matrix).is_err());
    }

    #[test]
    fn test_try_from_matrix_accepts_rigid() {
        let rotation = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let pose = Pose::from_parts(Vector3f::new(1.0, 0.0, 0.0), rotation);
        assert!(Pose::try_from_matrix(*pose.matrix()).is_ok());
    }

    #[test]
    fn test_transform_point_rotates() {
        let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f32::consts::FRAC_PI_2);
        let pose = Pose::from_parts(Vector3f::zeros(), rotation);
        let p = pose.transform_point(&Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }
}
