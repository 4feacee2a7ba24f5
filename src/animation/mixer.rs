use std::sync::Arc;

use slotmap::{SlotMap, new_key_type};

use crate::animation::action::AnimationAction;
use crate::animation::clip::AnimationClip;
use crate::animation::pose::{Pose, PoseBlender};

new_key_type! {
    /// Handle to an [`AnimationAction`] owned by an [`AnimationMixer`].
    pub struct ActionKey;
}

/// Owns the playback actions of one avatar and advances them each frame.
///
/// Instead of pushing "finished" events to listeners, the mixer records which
/// one-shot actions completed during the last [`update`](Self::update) so
/// callers can poll [`has_finished`](Self::has_finished) in the same frame.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: SlotMap<ActionKey, AnimationAction>,
    time: f32,
    finished: Vec<ActionKey>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the action playing `clip`, creating it on first use.
    ///
    /// Actions are matched by clip identity (the same `Arc`), not by name:
    /// exporters routinely give every clip in a file the same name.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>) -> ActionKey {
        let existing = self
            .actions
            .iter()
            .find_map(|(key, action)| Arc::ptr_eq(action.clip(), &clip).then_some(key));

        existing.unwrap_or_else(|| self.actions.insert(AnimationAction::new(clip)))
    }

    #[must_use]
    pub fn action(&self, key: ActionKey) -> Option<&AnimationAction> {
        self.actions.get(key)
    }

    pub fn action_mut(&mut self, key: ActionKey) -> Option<&mut AnimationAction> {
        self.actions.get_mut(key)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionKey, &AnimationAction)> {
        self.actions.iter()
    }

    /// Total mixer time in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances every running action by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.finished.clear();

        for (key, action) in &mut self.actions {
            if action.update(dt) {
                log::debug!("Action '{}' finished", action.clip().name);
                self.finished.push(key);
            }
        }
    }

    /// Whether `key` reached the end of a one-shot loop during the last update.
    #[must_use]
    pub fn has_finished(&self, key: ActionKey) -> bool {
        self.finished.contains(&key)
    }

    /// Fades `from` out and `to` in over `duration` seconds.
    ///
    /// With `warp`, both actions' time scales are ramped so that their cycle
    /// lengths meet halfway through the blend.
    pub fn cross_fade(&mut self, from: ActionKey, to: ActionKey, duration: f32, warp: bool) {
        if from == to {
            if let Some(action) = self.actions.get_mut(to) {
                action.fade_in(duration);
            }
            return;
        }

        let Some([prev, next]) = self.actions.get_disjoint_mut([from, to]) else {
            log::warn!("Cross-fade between unknown actions ignored");
            return;
        };

        prev.fade_out(duration);
        next.fade_in(duration);

        if warp {
            let fade_in_duration = next.clip().duration;
            let fade_out_duration = prev.clip().duration;
            if fade_in_duration > 0.0 && fade_out_duration > 0.0 {
                prev.warp(1.0, fade_out_duration / fade_in_duration, duration);
                next.warp(fade_in_duration / fade_out_duration, 1.0, duration);
            }
        }
    }

    /// Samples every contributing action and blends the results by weight.
    pub fn evaluate(&mut self) -> Pose {
        let mut blender = PoseBlender::default();

        for (_, action) in &mut self.actions {
            let weight = action.effective_weight();
            if !action.is_running() || weight <= 0.0 {
                continue;
            }

            let clip = Arc::clone(action.clip());
            for (index, track) in clip.tracks.iter().enumerate() {
                if let Some(value) = action.sample_track(index) {
                    blender.accumulate(&track.node_name, track.target, value, weight);
                }
            }
        }

        blender.finish()
    }
}
