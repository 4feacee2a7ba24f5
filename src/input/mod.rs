//! Platform-agnostic input
//!
//! [`InputState`] is the six-flag snapshot the state machine and controller
//! read every frame. It knows nothing about key codes: a [`KeyBindings`] table
//! translates [`Key`] events into flag changes, and platform adapters (see the
//! `winit` feature) translate native events into [`Key`]s.
//!
//! Several keys may drive the same flag (W and ArrowUp, both Shift keys), so
//! the physical keys currently down are tracked in [`HeldKeys`]: a flag stays
//! set while any key bound to it is held.

#[cfg(feature = "winit")]
pub mod winit_adapter;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Keyboard keys the controller can be bound to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    E,
    Q,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// The named flags of [`InputState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFlag {
    Forward,
    Backward,
    Left,
    Right,
    Action,
    Sprint,
}

/// Currently held movement and action keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
    pub sprint: bool,
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, flag: InputFlag, held: bool) {
        match flag {
            InputFlag::Forward => self.forward = held,
            InputFlag::Backward => self.backward = held,
            InputFlag::Left => self.left = held,
            InputFlag::Right => self.right = held,
            InputFlag::Action => self.action = held,
            InputFlag::Sprint => self.sprint = held,
        }
    }

    #[must_use]
    pub fn get(&self, flag: InputFlag) -> bool {
        match flag {
            InputFlag::Forward => self.forward,
            InputFlag::Backward => self.backward,
            InputFlag::Left => self.left,
            InputFlag::Right => self.right,
            InputFlag::Action => self.action,
            InputFlag::Sprint => self.sprint,
        }
    }

    /// Whether any longitudinal movement key is held.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward
    }

    /// Releases everything (e.g. when the window loses focus).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Set of keys currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pressed: FxHashSet<Key>,
}

impl HeldKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key event. Returns `false` for auto-repeats and for releases
    /// of keys that were not down.
    pub fn inject_key(&mut self, key: Key, state: ButtonState) -> bool {
        match state {
            ButtonState::Pressed => self.pressed.insert(key),
            ButtonState::Released => self.pressed.remove(&key),
        }
    }

    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

/// Maps keys to input flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    bindings: FxHashMap<Key, InputFlag>,
}

impl Default for KeyBindings {
    /// WASD to move and turn, Space to dance, Shift to sprint; arrows as aliases.
    fn default() -> Self {
        Self::empty()
            .bind(Key::W, InputFlag::Forward)
            .bind(Key::S, InputFlag::Backward)
            .bind(Key::A, InputFlag::Left)
            .bind(Key::D, InputFlag::Right)
            .bind(Key::Space, InputFlag::Action)
            .bind(Key::ShiftLeft, InputFlag::Sprint)
            .bind(Key::ShiftRight, InputFlag::Sprint)
            .bind(Key::ArrowUp, InputFlag::Forward)
            .bind(Key::ArrowDown, InputFlag::Backward)
            .bind(Key::ArrowLeft, InputFlag::Left)
            .bind(Key::ArrowRight, InputFlag::Right)
    }
}

impl KeyBindings {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: FxHashMap::default(),
        }
    }

    /// Binds `key` to `flag`, replacing any earlier binding of that key.
    #[must_use]
    pub fn bind(mut self, key: Key, flag: InputFlag) -> Self {
        self.bindings.insert(key, flag);
        self
    }

    pub fn unbind(&mut self, key: Key) -> Option<InputFlag> {
        self.bindings.remove(&key)
    }

    #[must_use]
    pub fn flag_for(&self, key: Key) -> Option<InputFlag> {
        self.bindings.get(&key).copied()
    }

    /// Records a key event in `held` and refreshes the flag bound to `key`.
    /// Returns `false` for unbound keys.
    pub fn apply(&self, input: &mut InputState, held: &mut HeldKeys, key: Key, state: ButtonState) -> bool {
        held.inject_key(key, state);
        let Some(flag) = self.flag_for(key) else {
            return false;
        };

        let any_held = self
            .bindings
            .iter()
            .any(|(&bound, &bound_flag)| bound_flag == flag && held.is_held(bound));
        input.set(flag, any_held);
        true
    }
}
