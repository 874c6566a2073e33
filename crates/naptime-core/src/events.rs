use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmPhase, FireSource, SessionId, SoundState, SoundTrigger};

/// Every state change in the alarm core produces an Event.
/// Hosts render them or log them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AlarmScheduled {
        session_id: SessionId,
        duration_secs: u64,
        fires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    CountdownTick {
        session_id: SessionId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session reached its target (or the OS said it did).
    AlarmFired {
        session_id: SessionId,
        source: FireSource,
        at: DateTime<Utc>,
    },
    SoundStarted {
        session_id: SessionId,
        trigger: SoundTrigger,
        at: DateTime<Utc>,
    },
    /// The OS already played its own one-shot sound; the looping sound is
    /// intentionally not started.
    SoundSuppressed {
        session_id: SessionId,
        trigger: SoundTrigger,
        at: DateTime<Utc>,
    },
    SoundFailed {
        session_id: SessionId,
        trigger: SoundTrigger,
        message: String,
        at: DateTime<Utc>,
    },
    AlarmStopped {
        session_id: SessionId,
        phase: AlarmPhase,
        sound_was_playing: bool,
        at: DateTime<Utc>,
    },
    /// A notification that is not the alarm; left to default OS presentation.
    NotificationPassedThrough {
        identifier: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: AlarmPhase,
        session_id: Option<SessionId>,
        remaining_secs: Option<u64>,
        fires_at: Option<DateTime<Utc>>,
        sound: SoundState,
        sound_handled: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Event::AlarmScheduled { session_id, .. }
            | Event::CountdownTick { session_id, .. }
            | Event::AlarmFired { session_id, .. }
            | Event::SoundStarted { session_id, .. }
            | Event::SoundSuppressed { session_id, .. }
            | Event::SoundFailed { session_id, .. }
            | Event::AlarmStopped { session_id, .. } => Some(*session_id),
            Event::StateSnapshot { session_id, .. } => *session_id,
            Event::NotificationPassedThrough { .. } => None,
        }
    }
}
