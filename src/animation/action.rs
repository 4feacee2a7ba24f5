use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play once, then clamp (or disable) at the final frame.
    Once,
    /// Wrap around to the start forever.
    Repeat,
}

/// Linear ramp evaluated against mixer time (unaffected by the action's time scale).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Ramp {
    fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    /// Returns `true` once the ramp has run its full duration.
    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }
}

/// Stateful playback handle bound to one clip.
///
/// Actions are created and owned by an [`AnimationMixer`](crate::animation::AnimationMixer);
/// callers address them through an [`ActionKey`](crate::animation::ActionKey).
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub clamp_when_finished: bool,
    pub paused: bool,
    pub enabled: bool,

    running: bool,
    fade: Option<Ramp>,
    warp: Option<Ramp>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            paused: false,
            enabled: true,
            running: false,
            fade: None,
            warp: None,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Schedules the action so the mixer advances it.
    pub fn play(&mut self) {
        self.running = true;
    }

    /// Unschedules the action and rewinds it.
    pub fn stop(&mut self) {
        self.running = false;
        self.reset();
    }

    /// Rewinds to the start, re-enables, and cancels any fade or warp.
    pub fn reset(&mut self) {
        self.paused = false;
        self.enabled = true;
        self.time = 0.0;
        self.fade = None;
        self.warp = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_loop(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    // ========================================================================
    // Weight & time scale
    // ========================================================================

    /// Sets the base weight and cancels any fade.
    ///
    /// Does not touch `enabled`: a disabled action keeps contributing nothing
    /// until it is re-enabled or [`reset`](Self::reset).
    pub fn set_effective_weight(&mut self, weight: f32) {
        self.weight = weight;
        self.fade = None;
    }

    /// Weight the action contributes this frame (zero when disabled).
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        self.weight * self.fade.map_or(1.0, |f| f.value())
    }

    /// Sets the time scale and cancels any warp.
    pub fn set_effective_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
        self.warp = None;
    }

    #[must_use]
    pub fn effective_time_scale(&self) -> f32 {
        if self.paused {
            return 0.0;
        }
        self.warp.map_or(self.time_scale, |w| w.value())
    }

    pub fn fade_in(&mut self, duration: f32) {
        self.fade = Some(Ramp::new(0.0, 1.0, duration));
    }

    pub fn fade_out(&mut self, duration: f32) {
        self.fade = Some(Ramp::new(1.0, 0.0, duration));
    }

    /// Ramps the effective time scale from `start` to `end` over `duration`.
    pub fn warp(&mut self, start: f32, end: f32, duration: f32) {
        self.warp = Some(Ramp::new(start, end, duration));
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    #[must_use]
    pub fn is_warping(&self) -> bool {
        self.warp.is_some()
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances the action by `dt` seconds of mixer time.
    ///
    /// Returns `true` on the tick a [`LoopMode::Once`] action reaches its end.
    pub(crate) fn update(&mut self, dt: f32) -> bool {
        if !self.running || !self.enabled {
            return false;
        }

        let time_scale = self.update_time_scale(dt);
        let finished = self.update_time(dt * time_scale);
        self.update_weight(dt);
        finished
    }

    fn update_time_scale(&mut self, dt: f32) -> f32 {
        let scale = self.effective_time_scale();
        if let Some(warp) = &mut self.warp
            && warp.advance(dt)
        {
            let end = warp.to;
            self.warp = None;
            if end == 0.0 {
                self.paused = true;
            } else {
                self.time_scale = end;
            }
        }
        scale
    }

    fn update_time(&mut self, delta: f32) -> bool {
        let duration = self.clip.duration;
        if duration <= 0.0 || delta == 0.0 {
            return false;
        }

        let time = self.time + delta;
        match self.loop_mode {
            LoopMode::Repeat => {
                self.time = time.rem_euclid(duration);
                false
            }
            LoopMode::Once => {
                if (0.0..duration).contains(&time) {
                    self.time = time;
                    return false;
                }
                self.time = time.clamp(0.0, duration);
                if self.clamp_when_finished {
                    self.paused = true;
                } else {
                    self.enabled = false;
                }
                true
            }
        }
    }

    fn update_weight(&mut self, dt: f32) {
        if let Some(fade) = &mut self.fade
            && fade.advance(dt)
        {
            let end = fade.to;
            self.fade = None;
            if end == 0.0 {
                self.enabled = false;
            }
        }
    }

    /// Gets the value of the specified track at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => t
                .sample_with_cursor(self.time, cursor)
                .map(TrackValue::Quaternion),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}
