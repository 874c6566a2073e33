//! Host services consumed by the alarm core.
//!
//! The core never talks to an OS directly. A host (mobile shell, terminal
//! runner, test harness) supplies a clock, a notification scheduler and a
//! looping sound player through these traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SchedulingError, SoundError};

/// Identifier of the single alarm notification.
pub const ALARM_NOTIFICATION_ID: &str = "alarmNotification";

/// Source of the current instant.
///
/// Wall-clock time is acceptable: remaining time is always recomputed from an
/// absolute target, so a host that was suspended self-corrects on the next
/// refresh.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A one-shot local notification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: String,
    pub after_secs: u64,
    pub title: String,
    pub body: String,
    /// Sound the OS plays when it presents the notification itself.
    pub sound: Option<String>,
}

impl NotificationRequest {
    pub fn alarm(after_secs: u64) -> Self {
        Self {
            id: ALARM_NOTIFICATION_ID.into(),
            after_secs,
            title: "⏰ Alarm".into(),
            body: "Time to wake up!".into(),
            sound: Some("alarm.wav".into()),
        }
    }
}

/// OS local-notification scheduling.
///
/// Scheduling while a request with the same id is pending does not replace
/// it on its own; callers cancel first.
pub trait NotificationScheduler {
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), SchedulingError>;
    fn cancel(&mut self, id: &str);
}

/// A sound that loops until stopped.
pub trait LoopingSoundPlayer {
    fn play(&mut self) -> Result<(), SoundError>;
    fn stop(&mut self);
}

impl<T: NotificationScheduler + ?Sized> NotificationScheduler for Box<T> {
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), SchedulingError> {
        (**self).schedule(request)
    }

    fn cancel(&mut self, id: &str) {
        (**self).cancel(id)
    }
}

impl<T: LoopingSoundPlayer + ?Sized> LoopingSoundPlayer for Box<T> {
    fn play(&mut self) -> Result<(), SoundError> {
        (**self).play()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
