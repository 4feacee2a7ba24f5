#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod controller;
pub mod errors;
pub mod fsm;
pub mod input;
pub mod scene;

pub use animation::{
    ActionKey, AnimationAction, AnimationClip, AnimationClipSet, AnimationMixer, ClipLoadSink, ClipSource,
    LoadProgress, LoopMode, Pose,
};
pub use controller::{CharacterController, ControllerConfig};
pub use errors::{Result, StriderError};
pub use fsm::{AnimationRig, LocomotionMachine, LocomotionState, State, StateMachine, Transition};
pub use input::{ButtonState, HeldKeys, InputFlag, InputState, Key, KeyBindings};
pub use scene::{FollowCamera, SceneGraph, Transform};
