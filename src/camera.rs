//! Camera and view-projection construction.
//!
//! Every scene looks at the origin from `(2, 2, 4)` through a perspective lens with
//! a vertical field of view of 2π/5, near plane 0.1 and far plane 100. A scene may
//! override the eye, target or up vector; the lens stays fixed.
//!
//! The view-projection matrix is computed once when a scene starts (or restarts
//! after a resize) and reused every frame.

use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Vertical field of view shared by all scenes, in radians.
pub const FOV_Y: f32 = 2.0 * PI / 5.0;
/// Near clip plane.
pub const Z_NEAR: f32 = 0.1;
/// Far clip plane.
pub const Z_FAR: f32 = 100.0;

/// Default eye position.
pub const DEFAULT_EYE: Vec3 = Vec3::new(2.0, 2.0, 4.0);

/// Look-at camera with a perspective lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
    /// Viewport width divided by height.
    pub aspect: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: DEFAULT_EYE,
            center: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fov_y: FOV_Y,
            near: Z_NEAR,
            far: Z_FAR,
        }
    }
}

impl Camera {
    /// Default camera for a viewport of the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Default::default()
        }
    }

    /// Camera for a `width × height` viewport. A zero height counts as 1.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(width as f32 / height.max(1) as f32)
    }

    pub fn eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    pub fn center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.center, self.up)
    }

    /// Camera-to-clip transform, depth mapped to `[0, 1]`.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Computes view, projection and their product in one go.
    pub fn build(&self) -> ViewProjection {
        let view = self.view_matrix();
        let projection = self.projection_matrix();

        ViewProjection {
            view,
            projection,
            view_projection: projection * view,
            camera: CameraInfo {
                eye: self.eye,
                center: self.center,
                zoom_max: 100.0,
                zoom_speed: 2.0,
            },
        }
    }
}

/// Camera parameters handed on to lighting uniforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraInfo {
    pub eye: Vec3,
    pub center: Vec3,
    pub zoom_max: f32,
    pub zoom_speed: f32,
}

/// Output of [`Camera::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
    /// `projection * view`.
    pub view_projection: Mat4,
    pub camera: CameraInfo,
}

/// Default-camera view-projection for the given aspect ratio.
pub fn view_projection(aspect: f32) -> ViewProjection {
    Camera::new(aspect).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    /// Right-handed look-at assembled row by row.
    fn reference_view(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let f = (center - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Mat4::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        )
    }

    /// Right-handed perspective with a `[0, 1]` depth range.
    fn reference_projection(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y / 2.0).tan();
        let range = near - far;

        Mat4::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, far / range, -1.0),
            Vec4::new(0.0, 0.0, near * far / range, 0.0),
        )
    }

    #[test]
    fn defaults_match_scene_constants() {
        let camera = Camera::default();
        assert_eq!(camera.eye, Vec3::new(2.0, 2.0, 4.0));
        assert_eq!(camera.center, Vec3::ZERO);
        assert_eq!(camera.up, Vec3::Y);
        assert!((camera.fov_y - 1.256_637).abs() < 1e-5);
        assert_eq!((camera.near, camera.far), (0.1, 100.0));
    }

    #[test]
    fn view_projection_matches_independent_reference() {
        let vp = view_projection(1.0);

        let view = reference_view(DEFAULT_EYE, Vec3::ZERO, Vec3::Y);
        let projection = reference_projection(2.0 * PI / 5.0, 1.0, 0.1, 100.0);

        assert!(vp.view.abs_diff_eq(view, 1e-5));
        assert!(vp.projection.abs_diff_eq(projection, 1e-5));
        assert!(vp.view_projection.abs_diff_eq(projection * view, 1e-5));
    }

    #[test]
    fn origin_lands_in_front_of_camera() {
        let vp = view_projection(1.0);
        let clip = vp.view_projection * Vec4::W;
        let ndc = clip / clip.w;

        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn aspect_follows_viewport() {
        let camera = Camera::for_viewport(1600, 800);
        assert_eq!(camera.aspect, 2.0);

        let squashed = Camera::for_viewport(640, 0);
        assert_eq!(squashed.aspect, 640.0);
    }

    #[test]
    fn overrides_flow_into_camera_info() {
        let info = Camera::new(1.5)
            .eye(Vec3::new(0.0, 0.0, 8.0))
            .center(Vec3::new(0.0, 1.0, 0.0))
            .build()
            .camera;

        assert_eq!(info.eye, Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(info.center, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(info.zoom_max, 100.0);
    }

    #[test]
    fn up_vector_changes_the_view() {
        let default = Camera::new(1.0).view_matrix();
        let tilted = Camera::new(1.0).up(Vec3::X).view_matrix();
        assert!(!default.abs_diff_eq(tilted, 1e-3));

        let same = Camera::new(1.0).up(Vec3::Y * 3.0).view_matrix();
        assert!(default.abs_diff_eq(same, 1e-6));
    }
}
