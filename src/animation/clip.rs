use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;
use crate::errors::{Result, StriderError};

/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.end_time(),
            TrackData::Quaternion(t) => t.end_time(),
        }
    }

    #[must_use]
    pub fn shape_error(&self) -> Option<String> {
        match self {
            TrackData::Vector3(t) => t.shape_error(),
            TrackData::Quaternion(t) => t.shape_error(),
        }
    }
}

/// A keyframe track plus the skeleton joint and property it drives.
#[derive(Debug, Clone)]
pub struct Track {
    pub node_name: String,
    pub target: TargetPath,
    pub data: TrackData,
}

/// Immutable animation data for one motion cycle.
///
/// Clips are shared (`Arc`) between the loader that produced them and the
/// actions that play them.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe across all tracks.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Builds a clip with an explicit duration (FBX-style clips carry one).
    #[must_use]
    pub fn with_duration(name: impl Into<String>, duration: f32, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Rejects clips that would make phase synchronization divide by zero,
    /// and clips whose keyframe data cannot be sampled.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(StriderError::InvalidClip {
                name: self.name.clone(),
                reason: "empty clip name".to_string(),
            });
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(StriderError::InvalidClip {
                name: self.name.clone(),
                reason: format!("duration must be positive, got {}", self.duration),
            });
        }
        for (index, track) in self.tracks.iter().enumerate() {
            if let Some(problem) = track.data.shape_error() {
                return Err(StriderError::InvalidClip {
                    name: self.name.clone(),
                    reason: format!("track {index} ('{}' {:?}): {problem}", track.node_name, track.target),
                });
            }
        }
        Ok(())
    }
}
