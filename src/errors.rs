//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`StriderError`] covers:
//! - State machine configuration errors (unknown or duplicate states)
//! - Clip validation and clip loading failures
//! - Controller configuration errors
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, StriderError>`.
//!
//! ```rust,ignore
//! use strider::errors::{StriderError, Result};
//!
//! fn enter_idle(fsm: &mut LocomotionMachine, rig: &mut AnimationRig) -> Result<()> {
//!     fsm.set_state("idle", rig)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum StriderError {
    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// A transition was requested into a state that was never registered.
    #[error("Unknown state: '{0}'")]
    UnknownState(String),

    /// A state name was registered twice.
    #[error("State '{0}' is already registered")]
    DuplicateState(String),

    /// The state's animation clip is not available, so it cannot be entered.
    #[error("Missing animation clip for state '{0}'")]
    MissingClip(String),

    // ========================================================================
    // Clip Errors
    // ========================================================================
    /// The clip failed validation when it was handed to the clip set.
    #[error("Invalid clip '{name}': {reason}")]
    InvalidClip {
        /// Name the clip was registered under
        name: String,
        /// Human-readable validation failure
        reason: String,
    },

    /// An external loader reported a failure for this clip.
    #[error("Failed to load clip '{name}': {reason}")]
    ClipLoadFailed {
        /// Name of the requested clip
        name: String,
        /// Loader-provided description
        reason: String,
    },

    /// A clip arrived that is not part of the required set.
    #[error("Unexpected clip '{0}'")]
    UnexpectedClip(String),

    /// The avatar (and its mixer) has not been attached yet or was torn down.
    #[error("Avatar not loaded")]
    AvatarNotLoaded,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Controller configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, StriderError>`.
pub type Result<T> = std::result::Result<T, StriderError>;
