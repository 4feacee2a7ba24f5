//! Named Clip Registry & Load Barrier
//!
//! [`AnimationClipSet`] maps a state name (`"idle"`, `"walk"`, ...) to the clip
//! and mixer action that animate it. Clips arrive one by one from independent
//! asynchronous loads; the set doubles as the join point over those loads.
//!
//! # Barrier
//!
//! [`expect`](AnimationClipSet::expect) arms the barrier with the names that
//! must be present. Every [`insert`](AnimationClipSet::insert) reports the
//! remaining count, and exactly one insert ever reports
//! [`LoadProgress::Ready`]. A name reported through
//! [`mark_failed`](AnimationClipSet::mark_failed) stays pending, so a set with
//! a failed clip never becomes ready.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::clip::AnimationClip;
use crate::animation::mixer::ActionKey;
use crate::errors::{Result, StriderError};

#[derive(Debug, Clone)]
pub struct ClipEntry {
    pub clip: Arc<AnimationClip>,
    pub action: ActionKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// Still waiting for this many required clips.
    Pending(usize),
    /// The last required clip just arrived. Reported once.
    Ready,
    /// The barrier already opened on an earlier call.
    AlreadyReady,
}

#[derive(Debug, Default)]
pub struct AnimationClipSet {
    entries: FxHashMap<String, ClipEntry>,
    expected: FxHashSet<String>,
    pending: FxHashSet<String>,
    failures: FxHashMap<String, String>,
    armed: bool,
    fired: bool,
}

impl AnimationClipSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the barrier with the full list of required names.
    pub fn expect<I, S>(&mut self, names: I) -> LoadProgress
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected = names.into_iter().map(Into::into).collect();
        self.pending = self
            .expected
            .iter()
            .filter(|name| !self.entries.contains_key(*name))
            .cloned()
            .collect();
        self.armed = true;
        self.progress()
    }

    /// Checks whether `clip` would be accepted under `name` without storing it.
    pub fn admit(&self, name: &str, clip: &AnimationClip) -> Result<()> {
        if self.armed && !self.expected.contains(name) {
            return Err(StriderError::UnexpectedClip(name.to_string()));
        }
        clip.validate().map_err(|e| match e {
            StriderError::InvalidClip { reason, .. } => StriderError::InvalidClip {
                name: name.to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Stores a loaded clip and its action, then reports barrier progress.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        clip: Arc<AnimationClip>,
        action: ActionKey,
    ) -> Result<LoadProgress> {
        let name = name.into();
        self.admit(&name, &clip)?;

        self.pending.remove(&name);
        self.failures.remove(&name);
        self.entries.insert(name, ClipEntry { clip, action });

        Ok(self.progress())
    }

    /// Records a load failure. The name stays pending.
    pub fn mark_failed(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        let name = name.into();
        let reason = reason.into();
        log::warn!("Clip '{name}' failed to load: {reason}");
        self.failures.insert(name, reason);
    }

    fn progress(&mut self) -> LoadProgress {
        if self.fired {
            return LoadProgress::AlreadyReady;
        }
        if self.armed && self.pending.is_empty() {
            self.fired = true;
            return LoadProgress::Ready;
        }
        LoadProgress::Pending(self.pending.len())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fired
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClipEntry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<ActionKey> {
        self.entries.get(name).map(|e| e.action)
    }

    /// Names still awaited by the barrier.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failures.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry and disarms the barrier.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
