//! Core error types for naptime-core.
//!
//! Collaborator failures (scheduling, playback) have their own enums so hosts
//! can report them precisely; [`AlarmError`] is what the alarm entry points
//! return. Playback failures never reach it: they are reported as
//! `Event::SoundFailed` and the session carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the alarm entry points.
#[derive(Error, Debug)]
pub enum AlarmError {
    /// Duration was zero, negative, or past the representable range.
    /// Rejected before any scheduling attempt.
    #[error("Invalid alarm duration: {seconds}s (must be positive)")]
    InvalidDuration { seconds: i64 },

    /// The host declined to schedule the alarm notification.
    #[error("Could not schedule alarm notification: {0}")]
    Scheduling(#[from] SchedulingError),
}

/// Failure reported by a [`NotificationScheduler`](crate::platform::NotificationScheduler).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// Notifications are not authorized (e.g. permission revoked).
    #[error("notification permission denied")]
    PermissionDenied,

    /// Any other refusal from the notification backend.
    #[error("{0}")]
    Rejected(String),
}

/// Failure reported by a [`LoopingSoundPlayer`](crate::platform::LoopingSoundPlayer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// The sound resource could not be found or loaded.
    #[error("alarm sound resource not found: {0}")]
    ResourceMissing(String),

    /// The output device refused to play.
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be prepared
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Result type alias for AlarmError
pub type Result<T, E = AlarmError> = std::result::Result<T, E>;
