use glam::{Mat4, Vec3};

use crate::scene::transform::Transform;

/// Perspective camera that rigidly trails the avatar.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowCamera {
    pub transform: Transform,
    /// Vertical field of view, in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl FollowCamera {
    /// `fov` is given in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            transform: Transform::new(),
            fov: fov.to_radians(),
            aspect,
            near,
            far,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.transform.translate(offset);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.transform.look_at(target, Vec3::Y);
    }

    /// Updates the aspect ratio after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.transform.matrix_as_mat4().inverse()
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
