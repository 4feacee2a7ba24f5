//! Generic finite state machine.
//!
//! A [`StateMachine`] holds a registry of state constructors keyed by name and
//! at most one live state. States never hold a pointer back to the machine:
//! everything they need is passed in as their [`State::Context`], and a state
//! requests a transition by returning the target name from
//! [`State::update`]. The machine then performs the transition itself, which
//! rules out re-entrant `enter`/`exit` calls.

use rustc_hash::FxHashMap;

use crate::errors::{Result, StriderError};
use crate::input::InputState;

/// Lifecycle of one state variant.
pub trait State: Sized {
    /// Data the state reads and mutates while active.
    type Context;

    /// Unique name; must match the name the state is registered under.
    fn name(&self) -> &'static str;

    /// Checked before the outgoing state is exited. An error aborts the
    /// transition and leaves the current state untouched.
    fn can_enter(&self, _ctx: &Self::Context) -> Result<()> {
        Ok(())
    }

    fn enter(&mut self, prev: Option<&Self>, ctx: &mut Self::Context);

    fn exit(&mut self, _ctx: &mut Self::Context) {}

    /// Returns the name of the state to switch to, if any.
    fn update(&mut self, dt: f32, input: &InputState, ctx: &mut Self::Context) -> Option<&'static str>;
}

pub type StateConstructor<S> = fn() -> S;

/// A completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<&'static str>,
    pub to: &'static str,
}

pub struct StateMachine<S: State> {
    registry: FxHashMap<&'static str, StateConstructor<S>>,
    current: Option<S>,
}

impl<S: State> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State + std::fmt::Debug> std::fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.registry.keys().collect();
        names.sort_unstable();
        f.debug_struct("StateMachine")
            .field("registered", &names)
            .field("current", &self.current)
            .finish()
    }
}

impl<S: State> StateMachine<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: FxHashMap::default(),
            current: None,
        }
    }

    /// Registers `constructor` under `name`.
    pub fn add_state(&mut self, name: &'static str, constructor: StateConstructor<S>) -> Result<()> {
        if self.registry.contains_key(name) {
            return Err(StriderError::DuplicateState(name.to_string()));
        }
        let candidate = constructor();
        if candidate.name() != name {
            return Err(StriderError::Config(format!(
                "state registered as '{name}' reports its name as '{}'",
                candidate.name()
            )));
        }
        self.registry.insert(name, constructor);
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(State::name)
    }

    /// Switches to the state registered under `name`.
    ///
    /// Requesting the current state is a no-op (`Ok(None)`). Otherwise the
    /// outgoing state is exited, a fresh instance of the new one is made
    /// current, and it is entered with the outgoing state as `prev`.
    pub fn set_state(&mut self, name: &str, ctx: &mut S::Context) -> Result<Option<Transition>> {
        let Some(&constructor) = self.registry.get(name) else {
            return Err(StriderError::UnknownState(name.to_string()));
        };

        if self.current_name() == Some(name) {
            return Ok(None);
        }

        let next = constructor();
        next.can_enter(ctx)?;

        let mut prev = self.current.take();
        if let Some(prev) = prev.as_mut() {
            prev.exit(ctx);
        }

        let state = self.current.insert(next);
        state.enter(prev.as_ref(), ctx);

        let transition = Transition {
            from: prev.as_ref().map(State::name),
            to: state.name(),
        };
        log::debug!(
            "State transition: {} -> {}",
            transition.from.unwrap_or("<none>"),
            transition.to
        );
        Ok(Some(transition))
    }

    /// Runs the current state's update and applies the transition it requests.
    pub fn update(&mut self, dt: f32, input: &InputState, ctx: &mut S::Context) -> Result<Option<Transition>> {
        let Some(state) = self.current.as_mut() else {
            return Ok(None);
        };

        match state.update(dt, input, ctx) {
            Some(next) => self.set_state(next, ctx),
            None => Ok(None),
        }
    }

    /// Exits and drops the current state, if any.
    pub fn clear(&mut self, ctx: &mut S::Context) {
        if let Some(mut state) = self.current.take() {
            state.exit(ctx);
        }
    }
}
