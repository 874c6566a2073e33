//! # NapTime Core Library
//!
//! The alarm logic behind NapTime: pick a delay, schedule a one-shot local
//! notification, show a live countdown, and ring a looping alarm when the
//! delay elapses -- without ringing twice when the OS already played its own
//! notification sound.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: a wall-clock-based state machine over a single
//!   alarm session; the caller invokes `refresh()` periodically
//! - **Sound Coordinator**: starts the looping sound at most once per
//!   session, whichever of the three trigger paths gets there first
//! - **Lifecycle Bridge**: routes host ticks and notification callbacks into
//!   the two components above and publishes the countdown view
//! - **Platform**: traits for the clock, notification scheduler and sound
//!   player the host provides
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: session timing and phase
//! - [`AlarmSoundCoordinator`]: per-session sound dedup
//! - [`NotificationLifecycleBridge`]: single entry point for hosts
//! - [`Config`]: Application configuration management

pub mod alarm;
pub mod config;
pub mod error;
pub mod events;
pub mod platform;
pub mod presets;
pub mod sim;

pub use alarm::{
    AlarmPhase, AlarmSession, AlarmSoundCoordinator, AlarmView, CountdownEngine, Dispatch,
    FireSource, HostEvent, NotificationLifecycleBridge, Presentation, SessionId, SoundState,
    SoundTrigger,
};
pub use config::Config;
pub use error::{AlarmError, ConfigError, SchedulingError, SoundError};
pub use events::Event;
pub use platform::{
    Clock, LoopingSoundPlayer, NotificationRequest, NotificationScheduler, SystemClock,
    ALARM_NOTIFICATION_ID,
};
pub use presets::Preset;
