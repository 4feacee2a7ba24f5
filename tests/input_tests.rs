//! Input Tests
//!
//! Tests for:
//! - InputState flag access
//! - KeyBindings defaults, rebinding and event application
//! - Keys sharing a flag (held-key tracking)
//! - Controller configuration round-trips through JSON

use strider::controller::ControllerConfig;
use strider::input::{ButtonState, HeldKeys, InputFlag, InputState, Key, KeyBindings};

// ============================================================================
// InputState
// ============================================================================

#[test]
fn flags_start_released() {
    let input = InputState::new();
    for flag in [
        InputFlag::Forward,
        InputFlag::Backward,
        InputFlag::Left,
        InputFlag::Right,
        InputFlag::Action,
        InputFlag::Sprint,
    ] {
        assert!(!input.get(flag), "{flag:?}");
    }
    assert!(!input.is_moving());
}

#[test]
fn set_and_clear() {
    let mut input = InputState::new();
    input.set(InputFlag::Backward, true);
    input.set(InputFlag::Sprint, true);
    assert!(input.backward && input.sprint);
    assert!(input.is_moving());

    input.clear();
    assert_eq!(input, InputState::default());
}

// ============================================================================
// KeyBindings
// ============================================================================

#[test]
fn default_bindings_use_wasd() {
    let bindings = KeyBindings::default();
    assert_eq!(bindings.flag_for(Key::W), Some(InputFlag::Forward));
    assert_eq!(bindings.flag_for(Key::S), Some(InputFlag::Backward));
    assert_eq!(bindings.flag_for(Key::A), Some(InputFlag::Left));
    assert_eq!(bindings.flag_for(Key::D), Some(InputFlag::Right));
    assert_eq!(bindings.flag_for(Key::Space), Some(InputFlag::Action));
    assert_eq!(bindings.flag_for(Key::ShiftLeft), Some(InputFlag::Sprint));
    assert_eq!(bindings.flag_for(Key::ShiftRight), Some(InputFlag::Sprint));
    assert_eq!(bindings.flag_for(Key::E), None);
}

#[test]
fn press_and_release_toggle_flag() {
    let bindings = KeyBindings::default();
    let mut input = InputState::new();
    let mut held = HeldKeys::new();

    assert!(bindings.apply(&mut input, &mut held, Key::ArrowUp, ButtonState::Pressed));
    assert!(input.forward);
    assert!(bindings.apply(&mut input, &mut held, Key::ArrowUp, ButtonState::Released));
    assert!(!input.forward);
}

#[test]
fn unbound_key_is_ignored() {
    let bindings = KeyBindings::default();
    let mut input = InputState::new();
    let mut held = HeldKeys::new();
    assert!(!bindings.apply(&mut input, &mut held, Key::Q, ButtonState::Pressed));
    assert_eq!(input, InputState::default());
    assert!(held.is_held(Key::Q));
}

#[test]
fn rebinding_replaces_previous_flag() {
    let mut bindings = KeyBindings::default().bind(Key::E, InputFlag::Action).bind(Key::W, InputFlag::Sprint);
    assert_eq!(bindings.flag_for(Key::W), Some(InputFlag::Sprint));
    assert_eq!(bindings.flag_for(Key::E), Some(InputFlag::Action));

    assert_eq!(bindings.unbind(Key::E), Some(InputFlag::Action));
    assert_eq!(bindings.unbind(Key::E), None);
}

#[test]
fn empty_bindings_map_nothing() {
    let bindings = KeyBindings::empty();
    let mut input = InputState::new();
    let mut held = HeldKeys::new();
    assert!(!bindings.apply(&mut input, &mut held, Key::W, ButtonState::Pressed));
}

// ============================================================================
// Keys sharing a flag
// ============================================================================

#[test]
fn held_keys_track_press_and_release() {
    let mut held = HeldKeys::new();
    assert!(held.inject_key(Key::W, ButtonState::Pressed));
    // Auto-repeat
    assert!(!held.inject_key(Key::W, ButtonState::Pressed));
    assert!(held.is_held(Key::W));

    assert!(held.inject_key(Key::W, ButtonState::Released));
    assert!(!held.inject_key(Key::W, ButtonState::Released));
    assert!(!held.is_held(Key::W));
}

#[test]
fn tapping_arrow_keeps_forward_while_w_is_held() {
    let bindings = KeyBindings::default();
    let mut input = InputState::new();
    let mut held = HeldKeys::new();

    bindings.apply(&mut input, &mut held, Key::W, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::ArrowUp, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::ArrowUp, ButtonState::Released);
    assert!(input.forward);

    bindings.apply(&mut input, &mut held, Key::W, ButtonState::Released);
    assert!(!input.forward);
}

#[test]
fn sprint_survives_releasing_the_other_shift() {
    let bindings = KeyBindings::default();
    let mut input = InputState::new();
    let mut held = HeldKeys::new();

    bindings.apply(&mut input, &mut held, Key::ShiftLeft, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::ShiftRight, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::ShiftRight, ButtonState::Released);
    assert!(input.sprint);

    bindings.apply(&mut input, &mut held, Key::ShiftLeft, ButtonState::Released);
    assert!(!input.sprint);
}

#[test]
fn aliases_do_not_leak_into_other_flags() {
    let bindings = KeyBindings::default();
    let mut input = InputState::new();
    let mut held = HeldKeys::new();

    bindings.apply(&mut input, &mut held, Key::W, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::ArrowDown, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::ArrowDown, ButtonState::Released);
    assert!(input.forward);
    assert!(!input.backward);
}

#[test]
fn rebinding_while_held_follows_new_map() {
    let bindings = KeyBindings::default().bind(Key::E, InputFlag::Forward);
    let mut input = InputState::new();
    let mut held = HeldKeys::new();

    bindings.apply(&mut input, &mut held, Key::E, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::W, ButtonState::Pressed);
    bindings.apply(&mut input, &mut held, Key::W, ButtonState::Released);
    assert!(input.forward, "E still drives forward");
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_round_trips_through_json() {
    let config = ControllerConfig {
        max_dt: Some(0.1),
        key_bindings: KeyBindings::default().bind(Key::E, InputFlag::Action),
        ..ControllerConfig::default()
    };

    let json = config.to_json_string().unwrap();
    let parsed = ControllerConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn key_bindings_parse_from_json() {
    let json = r#"{ "key_bindings": { "bindings": { "ArrowUp": "forward", "E": "action" } } }"#;
    let config = ControllerConfig::from_json_str(json).unwrap();

    assert_eq!(config.key_bindings.flag_for(Key::ArrowUp), Some(InputFlag::Forward));
    assert_eq!(config.key_bindings.flag_for(Key::E), Some(InputFlag::Action));
    assert_eq!(config.key_bindings.flag_for(Key::W), None);
}

#[test]
fn invalid_camera_is_rejected() {
    let json = r#"{ "camera": { "near": 10.0, "far": 5.0 } }"#;
    assert!(ControllerConfig::from_json_str(json).is_err());
}
