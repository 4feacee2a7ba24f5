//! Winit input adapter
//!
//! Translates winit keyboard events into the crate's platform-agnostic input types.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{ButtonState, HeldKeys, InputState, Key, KeyBindings};

/// Converts a winit `PhysicalKey` into a [`Key`], if the controller knows it.
#[must_use]
pub fn translate_key(physical_key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };

    let key = match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyQ => Key::Q,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        _ => return None,
    };

    Some(key)
}

#[must_use]
pub fn translate_button_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

/// Feeds a winit keyboard event through `bindings` into `input`.
pub fn handle_key_event(
    input: &mut InputState,
    held: &mut HeldKeys,
    bindings: &KeyBindings,
    event: &KeyEvent,
) -> bool {
    let Some(key) = translate_key(event.physical_key) else {
        return false;
    };
    bindings.apply(input, held, key, translate_button_state(event.state))
}
