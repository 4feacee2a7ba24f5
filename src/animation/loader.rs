//! Asynchronous clip loading.
//!
//! Clip I/O lives outside this crate. A [`ClipSource`] produces one clip per
//! name, and completions are pushed into a [`ClipLoadSink`] (a flume channel)
//! from whatever thread or executor ran the load. The controller owns the
//! receiving end and drains it once per frame, so every mutation still happens
//! on the frame thread.
//!
//! A sink whose controller was dropped simply discards further completions.

use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use rustc_hash::FxHashMap;

use crate::animation::clip::AnimationClip;
use crate::errors::{Result, StriderError};

#[derive(Debug)]
pub enum ClipLoadEvent {
    Loaded { name: String, clip: AnimationClip },
    Failed { name: String, reason: String },
}

/// Sending half handed to external loaders. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ClipLoadSink {
    tx: flume::Sender<ClipLoadEvent>,
}

impl ClipLoadSink {
    /// Reports a loaded clip. Returns `false` if the receiver is gone.
    pub fn loaded(&self, name: impl Into<String>, clip: AnimationClip) -> bool {
        self.send(ClipLoadEvent::Loaded {
            name: name.into(),
            clip,
        })
    }

    /// Reports a failed load. Returns `false` if the receiver is gone.
    pub fn failed(&self, name: impl Into<String>, reason: impl Into<String>) -> bool {
        self.send(ClipLoadEvent::Failed {
            name: name.into(),
            reason: reason.into(),
        })
    }

    fn send(&self, event: ClipLoadEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(flume::SendError(event)) => {
                log::debug!("Dropping late clip load event: {event:?}");
                false
            }
        }
    }
}

pub(crate) fn load_channel() -> (ClipLoadSink, flume::Receiver<ClipLoadEvent>) {
    let (tx, rx) = flume::unbounded();
    (ClipLoadSink { tx }, rx)
}

/// Anything that can asynchronously produce a clip by name.
pub trait ClipSource {
    fn load(&self, name: &str) -> impl Future<Output = Result<AnimationClip>>;
}

/// Clips held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClipSource {
    clips: FxHashMap<String, AnimationClip>,
}

impl InMemoryClipSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clip(mut self, name: impl Into<String>, clip: AnimationClip) -> Self {
        self.clips.insert(name.into(), clip);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, clip: AnimationClip) {
        self.clips.insert(name.into(), clip);
    }
}

impl ClipSource for InMemoryClipSource {
    async fn load(&self, name: &str) -> Result<AnimationClip> {
        self.clips
            .get(name)
            .cloned()
            .ok_or_else(|| StriderError::ClipLoadFailed {
                name: name.to_string(),
                reason: "not found".to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Runs one load per name concurrently and forwards each completion to `sink`
/// as soon as it finishes.
pub async fn load_clips<S: ClipSource>(source: &S, names: &[&str], sink: &ClipLoadSink) -> LoadSummary {
    let mut loads: FuturesUnordered<_> = names
        .iter()
        .map(|&name| async move { (name, source.load(name).await) })
        .collect();

    let mut summary = LoadSummary::default();
    while let Some((name, result)) = loads.next().await {
        match result {
            Ok(clip) => {
                summary.loaded += 1;
                sink.loaded(name, clip);
            }
            Err(e) => {
                summary.failed += 1;
                sink.failed(name, e.to_string());
            }
        }
    }
    summary
}
