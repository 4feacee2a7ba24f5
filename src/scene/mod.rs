//! Scene-side collaborators of the character controller.
//!
//! - [`Transform`]: position / rotation / scale of the avatar and camera
//! - [`FollowCamera`]: perspective camera that trails the avatar
//! - [`SceneGraph`]: the external scene the avatar's visual is attached to
//!
//! Rendering is out of scope: the renderer reads the avatar and camera
//! transforms back from the controller each frame.

pub mod transform;
pub mod camera;

pub use transform::{FORWARD, Transform};
pub use camera::FollowCamera;

/// A renderable scene that accepts the avatar's visual.
///
/// `Visual` is whatever opaque handle the host engine uses for a loaded mesh.
pub trait SceneGraph {
    type Visual;

    fn attach_visual(&mut self, visual: Self::Visual);
}

/// Collects visuals in attach order. Useful for headless hosts.
impl<T> SceneGraph for Vec<T> {
    type Visual = T;

    fn attach_visual(&mut self, visual: T) {
        self.push(visual);
    }
}
