//! Model-matrix composition.
//!
//! A [`Transform`] is a translation, a per-axis Euler rotation (radians) and a
//! per-axis scale. It composes into a 4×4 model matrix in one fixed order:
//!
//! ```text
//! model = T * (Rz * (Ry * (Rx * S)))
//! ```
//!
//! Points are scaled first, then rotated about X, Y and Z in that order, then
//! translated. Rotations do not commute, so every scene in the crate goes through
//! [`compose_model`] rather than building matrices by hand.
//!
//! # Example
//!
//! ```
//! use spinframe::{Transform, Vec3};
//!
//! let transform = Transform::new()
//!     .translation(Vec3::new(0.0, 1.0, 0.0))
//!     .rotation(Vec3::new(0.3, 0.0, 0.0))
//!     .uniform_scale(2.0);
//!
//! let model = transform.matrix();
//! assert_eq!(model.w_axis.y, 1.0);
//! ```

use glam::{Mat4, Vec3};

/// Translation, Euler rotation and scale of a single object.
///
/// A default transform sits at the origin, unrotated, at unit scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World-space offset.
    pub translation: Vec3,
    /// Rotation about X, Y and Z in radians, applied in that order.
    pub rotation: Vec3,
    /// Per-axis scale factors.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform that only rotates; used by the spinning-object scenes.
    pub fn from_rotation(rotation: Vec3) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    pub fn translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// The model matrix for this transform. See [`compose_model`].
    pub fn matrix(&self) -> Mat4 {
        compose_model(self.translation, self.rotation, self.scale)
    }

    /// Inverse-transpose of [`matrix`](Self::matrix), for transforming normals.
    pub fn normal_matrix(&self) -> Mat4 {
        normal_matrix(&self.matrix())
    }
}

/// Builds a model matrix as `T * (Rz * (Ry * (Rx * S)))`.
///
/// The order is load-bearing: swapping any two factors changes the rendered
/// orientation for all but trivial inputs.
pub fn compose_model(translation: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    let translate = Mat4::from_translation(translation);
    let rotate_x = Mat4::from_rotation_x(rotation.x);
    let rotate_y = Mat4::from_rotation_y(rotation.y);
    let rotate_z = Mat4::from_rotation_z(rotation.z);
    let scale = Mat4::from_scale(scale);

    translate * (rotate_z * (rotate_y * (rotate_x * scale)))
}

/// Inverse-transpose of a model matrix.
///
/// Keeps normals perpendicular to surfaces under non-uniform scale. A singular
/// model (zero scale on some axis) has no inverse; glam then yields non-finite
/// entries, so callers fall back to identity in that case.
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    let normal = model.inverse().transpose();
    if normal.is_finite() {
        normal
    } else {
        Mat4::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-6;

    #[test]
    fn default_is_identity() {
        assert!(Transform::new().matrix().abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn scale_then_rotate_x_then_translate() {
        // S = (2,3,4), Rx(90°) maps (x,y,z) to (x,-z,y), then T = (1,2,3):
        // p -> (2x + 1, -4z + 2, 3y + 3)
        let model = compose_model(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(FRAC_PI_2, 0.0, 0.0),
            Vec3::new(2.0, 3.0, 4.0),
        );

        let expected = Mat4::from_cols(
            Vec4::new(2.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 3.0, 0.0),
            Vec4::new(0.0, -4.0, 0.0, 0.0),
            Vec4::new(1.0, 2.0, 3.0, 1.0),
        );
        assert!(model.abs_diff_eq(expected, EPS), "{model:?}");
    }

    #[test]
    fn y_rotation_applies_before_z() {
        // Ry(90°): (x,y,z) -> (z,y,-x); Rz(90°): (x,y,z) -> (-y,x,z)
        // combined: (x,y,z) -> (-y, z, -x)
        let model = compose_model(Vec3::ZERO, Vec3::new(0.0, FRAC_PI_2, FRAC_PI_2), Vec3::ONE);

        let expected = Mat4::from_cols(
            Vec4::new(0.0, 0.0, -1.0, 0.0),
            Vec4::new(-1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::W,
        );
        assert!(model.abs_diff_eq(expected, EPS), "{model:?}");
    }

    #[test]
    fn order_is_not_commutative() {
        let rotation = Vec3::new(0.4, 0.7, 0.0);
        let fixed = compose_model(Vec3::ZERO, rotation, Vec3::ONE);
        let swapped = Mat4::from_rotation_x(rotation.x) * Mat4::from_rotation_y(rotation.y);

        assert!(!fixed.abs_diff_eq(swapped, 1e-3));
    }

    #[test]
    fn matches_explicit_product() {
        let t = Vec3::new(-1.5, 0.25, 7.0);
        let r = Vec3::new(0.3, -1.1, 2.4);
        let s = Vec3::new(0.5, 1.5, 2.0);

        let explicit = Mat4::from_translation(t)
            * Mat4::from_rotation_z(r.z)
            * Mat4::from_rotation_y(r.y)
            * Mat4::from_rotation_x(r.x)
            * Mat4::from_scale(s);

        let transform = Transform::new().translation(t).rotation(r).scale(s);
        assert!(transform.matrix().abs_diff_eq(explicit, 1e-5));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let transform = Transform::new().scale(Vec3::new(2.0, 1.0, 1.0));
        let normal = transform.normal_matrix();

        assert!((normal.x_axis.x - 0.5).abs() < EPS);
        assert!((normal.y_axis.y - 1.0).abs() < EPS);
    }

    #[test]
    fn singular_model_yields_identity_normal_matrix() {
        let transform = Transform::new().scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(transform.normal_matrix(), Mat4::IDENTITY);
    }
}
