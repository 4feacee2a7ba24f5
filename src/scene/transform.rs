use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Canonical local forward axis of the avatar rig.
pub const FORWARD: Vec3 = Vec3::Z;

/// Position, rotation and scale of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Local-to-parent matrix, for the renderer.
    #[must_use]
    pub fn matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    #[must_use]
    pub fn matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.matrix())
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Composes `rotation` in the object's local frame and renormalizes.
    pub fn rotate_local(&mut self, rotation: Quat) {
        self.rotation = (self.rotation * rotation).normalize();
    }

    /// World-space direction of [`FORWARD`] under the current rotation.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.rotation * FORWARD).normalize_or_zero()
    }

    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Points the object's -Z axis at `target` (camera convention).
    ///
    /// Leaves the rotation unchanged when `target` coincides with the position
    /// or lies along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }

        let right = forward.cross(up);
        if right.length_squared() < 1e-8 {
            return;
        }
        let right = right.normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat).normalize();
    }
}
