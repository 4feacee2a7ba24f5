//! Character Controller
//!
//! [`CharacterController`] ties the pieces together for one player avatar:
//! input flags, the locomotion state machine, the avatar's animation rig,
//! velocity/heading integration and a trailing camera.
//!
//! # Frame order
//!
//! Each [`update`](CharacterController::update) runs, in this order:
//!
//! 1. the mixer advances every running action by `dt`
//! 2. the state machine evaluates the active state against the input
//! 3. velocity is damped and accelerated, the heading turned, and the avatar
//!    moved along its forward axis
//! 4. the camera follows the avatar's displacement and re-aims at it
//!
//! Blend timing depends on this order.
//!
//! # Loading
//!
//! The controller is inert until [`attach_avatar`](CharacterController::attach_avatar)
//! creates the avatar and its mixer. Clips then arrive one at a time through
//! [`on_clip_loaded`](CharacterController::on_clip_loaded), directly or via the
//! [`ClipLoadSink`] drained by [`poll_loads`](CharacterController::poll_loads);
//! the first transition into `idle` happens when the last required clip lands.

pub mod config;

pub use config::{CameraConfig, ControllerConfig};

use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::loader::{ClipLoadEvent, load_channel};
use crate::animation::{AnimationClip, AnimationClipSet, AnimationMixer, ClipLoadSink, LoadProgress, Pose};
use crate::errors::{Result, StriderError};
use crate::fsm::{AnimationRig, IDLE, LOCOMOTION_STATES, LocomotionMachine, LocomotionState, Transition};
use crate::input::{ButtonState, HeldKeys, InputState, Key};
use crate::scene::{FollowCamera, SceneGraph, Transform};

pub struct CharacterController {
    config: ControllerConfig,

    velocity: Vec3,
    position: Vec3,

    input: InputState,
    held_keys: HeldKeys,
    fsm: LocomotionMachine,
    rig: Option<AnimationRig>,

    avatar: Option<Transform>,
    camera: FollowCamera,

    load_sink: ClipLoadSink,
    load_events: flume::Receiver<ClipLoadEvent>,
    shut_down: bool,
}

impl std::fmt::Debug for CharacterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterController")
            .field("state", &self.fsm.current_name())
            .field("velocity", &self.velocity)
            .field("position", &self.position)
            .field("input", &self.input)
            .field("avatar_attached", &self.avatar.is_some())
            .finish_non_exhaustive()
    }
}

impl CharacterController {
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;

        let mut camera = FollowCamera::new_perspective(
            config.camera.fov,
            config.camera.aspect,
            config.camera.near,
            config.camera.far,
        );
        camera.set_position(config.camera.position);
        camera.look_at(Vec3::ZERO);

        let (load_sink, load_events) = load_channel();

        Ok(Self {
            config,
            velocity: Vec3::ZERO,
            position: Vec3::ZERO,
            input: InputState::new(),
            held_keys: HeldKeys::new(),
            fsm: LocomotionState::machine()?,
            rig: None,
            avatar: None,
            camera,
            load_sink,
            load_events,
            shut_down: false,
        })
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Adds the avatar's visual to `scene` and creates its animation mixer.
    ///
    /// Arms the clip barrier with the four locomotion clip names.
    pub fn attach_avatar<G: SceneGraph>(&mut self, scene: &mut G, visual: G::Visual) -> Result<()> {
        if self.shut_down {
            return Err(StriderError::AvatarNotLoaded);
        }
        if self.avatar.is_some() {
            return Err(StriderError::Config("avatar already attached".to_string()));
        }

        scene.attach_visual(visual);
        self.avatar = Some(Transform::new().with_scale(self.config.avatar_scale));
        self.position = Vec3::ZERO;

        let mut rig = AnimationRig::new(self.config.crossfade_duration);
        rig.clips.expect(LOCOMOTION_STATES);
        self.rig = Some(rig);

        log::info!("Avatar attached; waiting for {} clips", LOCOMOTION_STATES.len());
        Ok(())
    }

    /// Registers a loaded clip under `name` and, once every required clip is
    /// present, enters `idle`.
    pub fn on_clip_loaded(&mut self, name: &str, clip: AnimationClip) -> Result<LoadProgress> {
        let Some(rig) = self.rig.as_mut() else {
            if self.shut_down {
                log::debug!("Ignoring clip '{name}' loaded after shutdown");
            }
            return Err(StriderError::AvatarNotLoaded);
        };

        rig.clips.admit(name, &clip)?;

        let clip = Arc::new(clip);
        let action = rig.mixer.clip_action(Arc::clone(&clip));
        if let Some(action) = rig.mixer.action_mut(action) {
            action.stop();
        }

        let progress = rig.clips.insert(name, clip, action)?;
        if progress == LoadProgress::Ready {
            log::info!("All clips loaded");
            self.fsm.set_state(IDLE, rig)?;
        }
        Ok(progress)
    }

    /// Records a failed clip load. The matching state can then never be entered.
    pub fn on_clip_failed(&mut self, name: &str, reason: &str) {
        match self.rig.as_mut() {
            Some(rig) => rig.clips.mark_failed(name, reason),
            None => log::warn!("Clip '{name}' failed to load: {reason}"),
        }
    }

    /// Sender for external loaders; completions are applied in [`poll_loads`](Self::poll_loads).
    #[must_use]
    pub fn load_sink(&self) -> ClipLoadSink {
        self.load_sink.clone()
    }

    /// Applies every queued load completion. Returns how many events were drained.
    pub fn poll_loads(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.load_events.try_recv() {
            drained += 1;
            match event {
                ClipLoadEvent::Loaded { name, clip } => {
                    if let Err(e) = self.on_clip_loaded(&name, clip) {
                        if self.shut_down {
                            log::debug!("Discarding clip '{name}': {e}");
                        } else {
                            log::warn!("Rejected clip '{name}': {e}");
                        }
                    }
                }
                ClipLoadEvent::Failed { name, reason } => self.on_clip_failed(&name, &reason),
            }
        }
        drained
    }

    /// Tears the avatar down. Loads that complete afterwards are ignored.
    pub fn shutdown(&mut self) {
        if let Some(rig) = self.rig.as_mut() {
            self.fsm.clear(rig);
        }
        self.rig = None;
        self.avatar = None;
        self.velocity = Vec3::ZERO;
        self.shut_down = true;
        log::info!("Character controller shut down");
    }

    // ========================================================================
    // Input & state
    // ========================================================================

    /// Routes a key event through the configured key bindings.
    pub fn handle_key(&mut self, key: Key, state: ButtonState) -> bool {
        self.config
            .key_bindings
            .apply(&mut self.input, &mut self.held_keys, key, state)
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn release_all_keys(&mut self) {
        self.held_keys.clear();
        self.input.clear();
    }

    /// Forces a transition, e.g. from gameplay code.
    pub fn set_state(&mut self, name: &str) -> Result<Option<Transition>> {
        let rig = self.rig.as_mut().ok_or(StriderError::AvatarNotLoaded)?;
        self.fsm.set_state(name, rig)
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    pub fn update(&mut self, dt: f32) {
        let (Some(avatar), Some(rig)) = (self.avatar.as_mut(), self.rig.as_mut()) else {
            return;
        };
        if !(dt.is_finite() && dt >= 0.0) {
            log::warn!("Ignoring invalid frame time {dt}");
            return;
        }
        let dt = self.config.max_dt.map_or(dt, |max_dt| dt.min(max_dt));

        rig.mixer.update(dt);

        if let Err(e) = self.fsm.update(dt, &self.input, rig) {
            log::warn!("State transition rejected: {e}");
        }

        // Damping; the longitudinal term may bring velocity to zero but never past it
        let velocity = &mut self.velocity;
        let mut frame_deceleration = *velocity * self.config.deceleration * dt;
        frame_deceleration.z =
            frame_deceleration.z.signum() * frame_deceleration.z.abs().min(velocity.z.abs());
        *velocity += frame_deceleration;

        let acceleration = self.config.acceleration;
        if self.input.forward {
            velocity.z += acceleration.z * dt;
        }
        if self.input.backward {
            velocity.z -= acceleration.z * dt;
        }

        let turn = self.config.turn_rate * dt * acceleration.y;
        if self.input.left {
            avatar.rotate_local(Quat::from_axis_angle(Vec3::Y, turn));
        }
        if self.input.right {
            avatar.rotate_local(Quat::from_axis_angle(Vec3::Y, -turn));
        }

        let old_position = avatar.position;
        let displacement = avatar.forward() * (velocity.z * dt);
        avatar.translate(displacement);
        self.position = avatar.position;

        if old_position.distance_squared(avatar.position) > self.config.camera_follow_threshold {
            self.camera.translate(displacement);
            self.camera.look_at(avatar.position);
        }
    }

    /// Blended skeletal pose for the renderer, once the avatar exists.
    pub fn evaluate_pose(&mut self) -> Option<Pose> {
        self.rig.as_mut().map(|rig| rig.mixer.evaluate())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.avatar.map_or(Quat::IDENTITY, |a| a.rotation)
    }

    /// Avatar transform for the renderer.
    #[must_use]
    pub fn avatar(&self) -> Option<&Transform> {
        self.avatar.as_ref()
    }

    #[must_use]
    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FollowCamera {
        &mut self.camera
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&'static str> {
        self.fsm.current_name()
    }

    #[must_use]
    pub fn state_machine(&self) -> &LocomotionMachine {
        &self.fsm
    }

    #[must_use]
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.rig.as_ref().map(|rig| &rig.mixer)
    }

    #[must_use]
    pub fn clips(&self) -> Option<&AnimationClipSet> {
        self.rig.as_ref().map(|rig| &rig.clips)
    }

    /// Whether every required clip has arrived.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.clips().is_some_and(AnimationClipSet::is_ready)
    }
}
