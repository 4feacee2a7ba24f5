use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far a cursor scans linearly before falling back to a binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in, so that
/// sequential playback samples in O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For `CubicSpline`, laid out as `[in_tangent, value, out_tangent]` per keyframe.
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Time of the last keyframe, or zero for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Samples at `time` without a cursor.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        self.sample_at_frame(self.search(time), time)
    }

    /// Samples at `time`, starting the keyframe search from `cursor` and
    /// leaving it on the interval that was used.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        let index = self.locate(time, cursor.last_index);
        cursor.last_index = index;
        self.sample_at_frame(index, time)
    }

    /// Index of the last keyframe at or before `time` (0 when `time` precedes the track).
    fn search(&self, time: f32) -> usize {
        self.times.partition_point(|&t| t <= time).saturating_sub(1)
    }

    /// Like [`search`](Self::search), but scans a few keyframes around `hint`
    /// first. Playback moves forward by a frame at a time, so the answer is
    /// almost always the hint or its neighbour.
    fn locate(&self, time: f32, hint: usize) -> usize {
        let last = self.times.len() - 1;
        let hint = hint.min(last);
        let contains = |i: usize| self.times[i] <= time && (i == last || time < self.times[i + 1]);

        let mut window = if time >= self.times[hint] {
            hint..=(hint + MAX_SCAN_OFFSET).min(last)
        } else {
            hint.saturating_sub(MAX_SCAN_OFFSET)..=hint
        };
        if let Some(i) = window.find(|&i| contains(i)) {
            return i;
        }
        // Loop wrap, scrub, or time before the first keyframe
        self.search(time)
    }

    /// Describes why the keyframe data cannot be sampled, if it can't.
    ///
    /// CubicSpline tracks need three values (in-tangent, value, out-tangent)
    /// per keyframe; the other modes need one. Times must be finite and
    /// non-decreasing.
    #[must_use]
    pub fn shape_error(&self) -> Option<String> {
        let stride = match self.interpolation {
            InterpolationMode::CubicSpline => 3,
            InterpolationMode::Linear | InterpolationMode::Step => 1,
        };
        if self.values.len() != self.times.len() * stride {
            return Some(format!(
                "{} keyframes need {} values for {:?}, found {}",
                self.times.len(),
                self.times.len() * stride,
                self.interpolation,
                self.values.len()
            ));
        }
        if self.times.iter().any(|t| !t.is_finite()) {
            return Some("non-finite keyframe time".to_string());
        }
        if self.times.windows(2).any(|w| w[1] < w[0]) {
            return Some("keyframe times are not sorted".to_string());
        }
        None
    }

    fn value_at(&self, index: usize) -> Option<T> {
        let slot = match self.interpolation {
            InterpolationMode::CubicSpline => index * 3 + 1,
            InterpolationMode::Linear | InterpolationMode::Step => index,
        };
        self.values.get(slot).copied()
    }

    /// `None` when the value buffer is shorter than the keyframe layout requires.
    fn sample_at_frame(&self, index: usize, time: f32) -> Option<T> {
        let last = self.times.len() - 1;
        if index >= last {
            return self.value_at(last);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => Some(T::interpolate_linear(
                self.value_at(index)?,
                self.value_at(next_idx)?,
                t,
            )),
            InterpolationMode::CubicSpline => {
                let raw = |i: usize| self.values.get(i).copied();
                let (i_prev, i_next) = (index * 3, next_idx * 3);
                Some(T::interpolate_cubic(
                    raw(i_prev + 1)?,
                    raw(i_prev + 2)?,
                    raw(i_next)?,
                    raw(i_next + 1)?,
                    t,
                    dt,
                ))
            }
        }
    }
}
