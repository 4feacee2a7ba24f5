//! Locomotion states: Idle, Walk, Run and Dance.
//!
//! The three cyclic gaits share one entry routine: the incoming clip's time
//! cursor is moved to the same cycle phase as the outgoing clip, then the two
//! are cross-faded with time warping. Dance is a one-shot; it skips phase sync
//! and leaves on its own once the mixer reports the clip finished.

use crate::animation::{ActionKey, AnimationClipSet, AnimationMixer, LoopMode};
use crate::errors::{Result, StriderError};
use crate::fsm::machine::{State, StateMachine};
use crate::input::InputState;

pub const IDLE: &str = "idle";
pub const WALK: &str = "walk";
pub const RUN: &str = "run";
pub const DANCE: &str = "dance";

/// Every state name, which is also the name of the clip that animates it.
pub const LOCOMOTION_STATES: [&str; 4] = [IDLE, WALK, RUN, DANCE];

pub const DEFAULT_CROSSFADE_DURATION: f32 = 0.5;

/// Animation data the locomotion states drive: the avatar's mixer and the
/// clips registered for each state.
#[derive(Debug)]
pub struct AnimationRig {
    pub mixer: AnimationMixer,
    pub clips: AnimationClipSet,
    /// Blend window, in the same unit as `dt`.
    pub crossfade_duration: f32,
}

impl Default for AnimationRig {
    fn default() -> Self {
        Self {
            mixer: AnimationMixer::new(),
            clips: AnimationClipSet::new(),
            crossfade_duration: DEFAULT_CROSSFADE_DURATION,
        }
    }
}

impl AnimationRig {
    #[must_use]
    pub fn new(crossfade_duration: f32) -> Self {
        Self {
            crossfade_duration,
            ..Self::default()
        }
    }

    fn action_for(&self, state: &str) -> Option<ActionKey> {
        self.clips.action(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionState {
    Idle,
    Walk,
    Run,
    /// `listening` is set while the state waits for the dance clip to finish.
    Dance { listening: bool },
}

pub type LocomotionMachine = StateMachine<LocomotionState>;

impl LocomotionState {
    #[must_use]
    pub fn idle() -> Self {
        Self::Idle
    }

    #[must_use]
    pub fn walk() -> Self {
        Self::Walk
    }

    #[must_use]
    pub fn run() -> Self {
        Self::Run
    }

    #[must_use]
    pub fn dance() -> Self {
        Self::Dance { listening: false }
    }

    /// Builds a machine with all four states registered.
    pub fn machine() -> Result<LocomotionMachine> {
        let mut fsm = StateMachine::new();
        fsm.add_state(IDLE, Self::idle)?;
        fsm.add_state(WALK, Self::walk)?;
        fsm.add_state(RUN, Self::run)?;
        fsm.add_state(DANCE, Self::dance)?;
        Ok(fsm)
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Dance { listening: true })
    }

    /// Stops waiting for the dance clip. Safe to call repeatedly.
    fn stop_listening(&mut self) {
        if let Self::Dance { listening } = self {
            *listening = false;
        }
    }
}

/// Start time for the incoming clip so it resumes at the outgoing clip's phase.
#[must_use]
pub fn synced_start_time(prev_time: f32, prev_duration: f32, next_duration: f32) -> f32 {
    if prev_duration <= 0.0 {
        return 0.0;
    }
    let ratio = prev_time.rem_euclid(prev_duration) / prev_duration;
    ratio * next_duration
}

fn enter_cyclic(name: &str, prev: Option<&LocomotionState>, rig: &mut AnimationRig) {
    let Some(key) = rig.action_for(name) else {
        log::warn!("No action registered for '{name}'");
        return;
    };
    let prev_key = prev.and_then(|p| rig.action_for(p.name()));

    if let Some(prev_key) = prev_key {
        let prev_phase = rig
            .mixer
            .action(prev_key)
            .map(|a| (a.time, a.clip().duration));

        if let Some(action) = rig.mixer.action_mut(key) {
            if let Some((prev_time, prev_duration)) = prev_phase {
                action.time = synced_start_time(prev_time, prev_duration, action.clip().duration);
            }
            action.enabled = true;
            action.set_effective_time_scale(1.0);
            action.set_effective_weight(1.0);
        }
        rig.mixer.cross_fade(prev_key, key, rig.crossfade_duration, true);
    }

    if let Some(action) = rig.mixer.action_mut(key) {
        action.play();
    }
}

fn enter_dance(prev: Option<&LocomotionState>, rig: &mut AnimationRig) {
    let Some(key) = rig.action_for(DANCE) else {
        log::warn!("No action registered for '{DANCE}'");
        return;
    };

    if let Some(action) = rig.mixer.action_mut(key) {
        action.reset();
        action.set_loop(LoopMode::Once);
        action.clamp_when_finished = true;
    }
    if let Some(prev_key) = prev.and_then(|p| rig.action_for(p.name())) {
        rig.mixer.cross_fade(prev_key, key, rig.crossfade_duration, true);
    }
    if let Some(action) = rig.mixer.action_mut(key) {
        action.play();
    }
}

impl State for LocomotionState {
    type Context = AnimationRig;

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => IDLE,
            Self::Walk => WALK,
            Self::Run => RUN,
            Self::Dance { .. } => DANCE,
        }
    }

    fn can_enter(&self, rig: &AnimationRig) -> Result<()> {
        if rig.clips.contains(self.name()) {
            Ok(())
        } else {
            Err(StriderError::MissingClip(self.name().to_string()))
        }
    }

    fn enter(&mut self, prev: Option<&Self>, rig: &mut AnimationRig) {
        match self {
            Self::Idle | Self::Walk | Self::Run => enter_cyclic(self.name(), prev, rig),
            Self::Dance { listening } => {
                enter_dance(prev, rig);
                *listening = true;
            }
        }
    }

    fn exit(&mut self, _rig: &mut AnimationRig) {
        self.stop_listening();
    }

    fn update(&mut self, _dt: f32, input: &InputState, rig: &mut AnimationRig) -> Option<&'static str> {
        match self {
            Self::Idle => {
                if input.forward || input.backward {
                    Some(WALK)
                } else if input.action {
                    Some(DANCE)
                } else {
                    None
                }
            }
            Self::Walk => {
                if input.forward && input.sprint {
                    Some(RUN)
                } else if !input.forward && !input.backward {
                    Some(IDLE)
                } else {
                    None
                }
            }
            // Not the inverse of Walk's entry condition: releasing sprint
            // alone keeps the avatar running.
            Self::Run => (!input.forward || input.backward).then_some(WALK),
            Self::Dance { listening } => {
                let finished = *listening
                    && rig
                        .action_for(DANCE)
                        .is_some_and(|key| rig.mixer.has_finished(key));
                if finished {
                    *listening = false;
                    Some(IDLE)
                } else {
                    None
                }
            }
        }
    }
}
