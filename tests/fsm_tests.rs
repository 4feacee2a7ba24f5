//! State Machine Tests
//!
//! Tests for:
//! - StateMachine registry, idempotent set_state, exit-before-enter ordering
//! - Configuration errors (unknown / duplicate / refused states)
//! - Locomotion transitions, phase sync and cross-fade setup
//! - Dance completion and forced exit

use std::sync::Arc;

use strider::animation::{AnimationClip, LoopMode};
use strider::errors::StriderError;
use strider::fsm::{AnimationRig, DANCE, IDLE, LocomotionState, RUN, State, StateMachine, WALK};
use strider::input::InputState;

const EPSILON: f32 = 1e-5;
const FRAME: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Recording states
// ============================================================================

#[derive(Debug)]
enum Recorder {
    A,
    B,
    Locked,
}

impl State for Recorder {
    type Context = Vec<String>;

    fn name(&self) -> &'static str {
        match self {
            Recorder::A => "a",
            Recorder::B => "b",
            Recorder::Locked => "locked",
        }
    }

    fn can_enter(&self, _log: &Vec<String>) -> strider::Result<()> {
        match self {
            Recorder::Locked => Err(StriderError::MissingClip("locked".to_string())),
            _ => Ok(()),
        }
    }

    fn enter(&mut self, prev: Option<&Self>, log: &mut Vec<String>) {
        log.push(format!("enter {} from {}", self.name(), prev.map_or("none", State::name)));
    }

    fn exit(&mut self, log: &mut Vec<String>) {
        log.push(format!("exit {}", self.name()));
    }

    fn update(&mut self, _dt: f32, input: &InputState, _log: &mut Vec<String>) -> Option<&'static str> {
        if input.forward {
            Some("b")
        } else if input.backward {
            Some("a")
        } else {
            None
        }
    }
}

fn recording_machine() -> StateMachine<Recorder> {
    let mut fsm = StateMachine::new();
    fsm.add_state("a", || Recorder::A).unwrap();
    fsm.add_state("b", || Recorder::B).unwrap();
    fsm.add_state("locked", || Recorder::Locked).unwrap();
    fsm
}

#[test]
fn first_transition_enters_without_previous() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();

    let t = fsm.set_state("a", &mut log).unwrap().unwrap();
    assert_eq!(t.from, None);
    assert_eq!(t.to, "a");
    assert_eq!(log, vec!["enter a from none"]);
}

#[test]
fn set_state_twice_is_noop() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();

    fsm.set_state("a", &mut log).unwrap();
    assert!(fsm.set_state("a", &mut log).unwrap().is_none());
    assert_eq!(log.len(), 1);
    assert_eq!(fsm.current_name(), Some("a"));
}

#[test]
fn exit_runs_before_enter() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();

    fsm.set_state("a", &mut log).unwrap();
    fsm.set_state("b", &mut log).unwrap();
    assert_eq!(log, vec!["enter a from none", "exit a", "enter b from a"]);
}

#[test]
fn unknown_state_is_a_configuration_error() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();
    fsm.set_state("a", &mut log).unwrap();

    let err = fsm.set_state("flying", &mut log).unwrap_err();
    assert!(matches!(err, StriderError::UnknownState(ref n) if n == "flying"));
    assert_eq!(fsm.current_name(), Some("a"));
    assert_eq!(log.len(), 1, "no exit/enter on a failed transition");
}

#[test]
fn refused_state_leaves_current_untouched() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();
    fsm.set_state("a", &mut log).unwrap();

    assert!(fsm.set_state("locked", &mut log).is_err());
    assert_eq!(fsm.current_name(), Some("a"));
    assert_eq!(log, vec!["enter a from none"]);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut fsm = recording_machine();
    let err = fsm.add_state("a", || Recorder::B).unwrap_err();
    assert!(matches!(err, StriderError::DuplicateState(ref n) if n == "a"));
}

#[test]
fn registration_name_must_match_state_name() {
    let mut fsm: StateMachine<Recorder> = StateMachine::new();
    assert!(matches!(fsm.add_state("c", || Recorder::A), Err(StriderError::Config(_))));
}

#[test]
fn update_without_state_is_noop() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();
    let input = InputState {
        forward: true,
        ..InputState::default()
    };
    assert!(fsm.update(FRAME, &input, &mut log).unwrap().is_none());
    assert!(log.is_empty());
}

#[test]
fn update_applies_requested_transition() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();
    fsm.set_state("a", &mut log).unwrap();

    let input = InputState {
        forward: true,
        ..InputState::default()
    };
    let t = fsm.update(FRAME, &input, &mut log).unwrap().unwrap();
    assert_eq!((t.from, t.to), (Some("a"), "b"));

    // Requesting the active state again does nothing
    assert!(fsm.update(FRAME, &input, &mut log).unwrap().is_none());
}

#[test]
fn clear_exits_current_state() {
    let mut fsm = recording_machine();
    let mut log = Vec::new();
    fsm.set_state("b", &mut log).unwrap();
    fsm.clear(&mut log);
    assert_eq!(fsm.current_name(), None);
    assert_eq!(log.last().map(String::as_str), Some("exit b"));
}

// ============================================================================
// Locomotion states
// ============================================================================

fn rig(durations: &[(&str, f32)]) -> AnimationRig {
    let mut rig = AnimationRig::default();
    for &(name, duration) in durations {
        let clip = Arc::new(AnimationClip::with_duration(name, duration, vec![]));
        let key = rig.mixer.clip_action(Arc::clone(&clip));
        rig.clips.insert(name, clip, key).unwrap();
    }
    rig
}

/// Full rig whose clips all carry the same exported name.
fn shared_name_rig(clip_name: &str) -> AnimationRig {
    let mut rig = AnimationRig::default();
    for (state, duration) in [(IDLE, 4.0), (WALK, 2.0), (RUN, 1.0), (DANCE, 6.0)] {
        let clip = Arc::new(AnimationClip::with_duration(clip_name, duration, vec![]));
        let key = rig.mixer.clip_action(Arc::clone(&clip));
        rig.clips.insert(state, clip, key).unwrap();
    }
    rig
}

fn full_rig() -> AnimationRig {
    rig(&[(IDLE, 4.0), (WALK, 2.0), (RUN, 1.0), (DANCE, 6.0)])
}

fn held(f: impl FnOnce(&mut InputState)) -> InputState {
    let mut input = InputState::default();
    f(&mut input);
    input
}

fn tick(fsm: &mut StateMachine<LocomotionState>, rig: &mut AnimationRig, input: &InputState) {
    rig.mixer.update(FRAME);
    fsm.update(FRAME, input, rig).unwrap();
}

#[test]
fn locomotion_machine_registers_four_states() {
    let fsm = LocomotionState::machine().unwrap();
    for name in [IDLE, WALK, RUN, DANCE] {
        assert!(fsm.is_registered(name), "{name}");
    }
}

#[test]
fn first_idle_just_plays() {
    let mut rig = full_rig();
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();

    let idle = rig.mixer.action(rig.clips.action(IDLE).unwrap()).unwrap();
    assert!(idle.is_running());
    assert!(!idle.is_fading());
}

#[test]
fn walk_starts_at_idle_phase() {
    let mut rig = full_rig();
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();

    let idle_key = rig.clips.action(IDLE).unwrap();
    // 5.0 into a 4.0s loop is a quarter of the way through the cycle
    rig.mixer.action_mut(idle_key).unwrap().time = 5.0;

    fsm.set_state(WALK, &mut rig).unwrap();

    let walk = rig.mixer.action(rig.clips.action(WALK).unwrap()).unwrap();
    assert!(approx(walk.time, 0.25 * 2.0), "got {}", walk.time);
    assert!(walk.is_running());
    assert!(walk.is_fading() && walk.is_warping());
    assert!(rig.mixer.action(idle_key).unwrap().is_fading());
}

#[test]
fn gait_transitions_follow_input() {
    let mut rig = full_rig();
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();

    tick(&mut fsm, &mut rig, &held(|i| i.backward = true));
    assert_eq!(fsm.current_name(), Some(WALK));

    tick(&mut fsm, &mut rig, &held(|i| {
        i.forward = true;
        i.sprint = true;
    }));
    assert_eq!(fsm.current_name(), Some(RUN));

    // Releasing sprint while still moving forward keeps running
    tick(&mut fsm, &mut rig, &held(|i| i.forward = true));
    assert_eq!(fsm.current_name(), Some(RUN));

    tick(&mut fsm, &mut rig, &held(|i| {
        i.forward = true;
        i.backward = true;
    }));
    assert_eq!(fsm.current_name(), Some(WALK));

    tick(&mut fsm, &mut rig, &InputState::default());
    assert_eq!(fsm.current_name(), Some(IDLE));
}

#[test]
fn idle_prefers_movement_over_dance() {
    let mut rig = full_rig();
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();

    tick(&mut fsm, &mut rig, &held(|i| {
        i.forward = true;
        i.action = true;
    }));
    assert_eq!(fsm.current_name(), Some(WALK));
}

#[test]
fn dance_plays_once_then_returns_to_idle() {
    let mut rig = full_rig();
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();

    tick(&mut fsm, &mut rig, &held(|i| i.action = true));
    assert_eq!(fsm.current_name(), Some(DANCE));
    assert!(fsm.current().unwrap().is_listening());

    let dance_key = rig.clips.action(DANCE).unwrap();
    let dance = rig.mixer.action(dance_key).unwrap();
    assert_eq!(dance.loop_mode, LoopMode::Once);
    assert!(dance.clamp_when_finished);

    // Movement input does not interrupt the dance
    let mut returns = 0;
    let mut elapsed = 0.0;
    while elapsed < 10.0 {
        rig.mixer.update(FRAME);
        elapsed += FRAME;
        if let Some(t) = fsm.update(FRAME, &held(|i| i.forward = true), &mut rig).unwrap() {
            assert_eq!((t.from, t.to), (Some(DANCE), IDLE));
            returns += 1;
            break;
        }
        assert_eq!(fsm.current_name(), Some(DANCE));
    }

    assert_eq!(returns, 1);
    // The blend-in warp speeds the dance up slightly, but it still plays most of its length
    assert!(elapsed > 5.0, "returned after {elapsed}s");
    assert!(rig.mixer.action(dance_key).unwrap().paused);
}

#[test]
fn dance_forced_exit_stops_listening() {
    let mut rig = full_rig();
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();
    fsm.set_state(DANCE, &mut rig).unwrap();

    fsm.set_state(WALK, &mut rig).unwrap();
    assert_eq!(fsm.current_name(), Some(WALK));

    // The dance clip finishing later must not drag the avatar back to idle
    let walking = held(|i| i.forward = true);
    for _ in 0..600 {
        tick(&mut fsm, &mut rig, &walking);
        assert_eq!(fsm.current_name(), Some(WALK));
    }
}

#[test]
fn missing_clip_blocks_transition() {
    let mut rig = rig(&[(IDLE, 1.0), (WALK, 1.0), (DANCE, 1.0)]);
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();
    fsm.set_state(WALK, &mut rig).unwrap();

    rig.mixer.update(FRAME);
    let running = held(|i| {
        i.forward = true;
        i.sprint = true;
    });
    let err = fsm.update(FRAME, &running, &mut rig).unwrap_err();
    assert!(matches!(err, StriderError::MissingClip(ref n) if n == RUN));
    assert_eq!(fsm.current_name(), Some(WALK));
}

// ============================================================================
// Clip names independent of state keys
// ============================================================================

fn dance_until_idle(fsm: &mut StateMachine<LocomotionState>, rig: &mut AnimationRig) -> f32 {
    tick(fsm, rig, &held(|i| i.action = true));
    assert_eq!(fsm.current_name(), Some(DANCE));

    let mut elapsed = 0.0;
    while fsm.current_name() == Some(DANCE) {
        assert!(elapsed < 20.0, "dance never finished");
        tick(fsm, rig, &InputState::default());
        elapsed += FRAME;
    }
    assert_eq!(fsm.current_name(), Some(IDLE));
    elapsed
}

#[test]
fn shared_clip_name_walk_then_idle_keeps_idle_looping() {
    let mut rig = shared_name_rig("mixamo.com");
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();

    let idle_key = rig.clips.action(IDLE).unwrap();
    let walk_key = rig.clips.action(WALK).unwrap();
    assert_ne!(idle_key, walk_key);

    tick(&mut fsm, &mut rig, &held(|i| i.forward = true));
    assert_eq!(fsm.current_name(), Some(WALK));
    assert!(approx(rig.mixer.action(walk_key).unwrap().clip().duration, 2.0));

    tick(&mut fsm, &mut rig, &InputState::default());
    assert_eq!(fsm.current_name(), Some(IDLE));

    let idle = rig.mixer.action(idle_key).unwrap();
    assert_eq!(idle.loop_mode, LoopMode::Repeat);
    assert!(!idle.paused);
    assert!(idle.is_running());
}

#[test]
fn shared_clip_name_dance_cycles_repeat() {
    let mut rig = shared_name_rig("mixamo.com");
    let mut fsm = LocomotionState::machine().unwrap();
    fsm.set_state(IDLE, &mut rig).unwrap();
    let idle_key = rig.clips.action(IDLE).unwrap();
    let dance_key = rig.clips.action(DANCE).unwrap();

    for round in 0..3 {
        let took = dance_until_idle(&mut fsm, &mut rig);
        assert!(took > 5.0, "round {round}: returned after {took}s");

        for _ in 0..60 {
            tick(&mut fsm, &mut rig, &InputState::default());
        }
        let idle = rig.mixer.action(idle_key).unwrap();
        assert_eq!(idle.loop_mode, LoopMode::Repeat, "round {round}");
        assert!(!idle.paused, "round {round}");
        assert_eq!(rig.mixer.action(dance_key).unwrap().loop_mode, LoopMode::Once);
    }
}
