pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod mixer;
pub mod pose;
pub mod clip_set;
pub mod loader;

pub use clip::{AnimationClip, TargetPath, Track, TrackData};
pub use action::{AnimationAction, LoopMode, TrackValue};
pub use mixer::{ActionKey, AnimationMixer};
pub use pose::{JointPose, Pose};
pub use clip_set::{AnimationClipSet, ClipEntry, LoadProgress};
pub use loader::{ClipLoadEvent, ClipLoadSink, ClipSource, InMemoryClipSource, LoadSummary, load_clips};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
