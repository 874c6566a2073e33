//! Deterministic host doubles.
//!
//! A manually advanced clock plus a scheduler and player that record every
//! call. Each double is a cheap handle over shared state, so a test (or the
//! CLI simulator) can keep one clone and hand the other to the bridge.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::error::{SchedulingError, SoundError};
use crate::platform::{Clock, LoopingSoundPlayer, NotificationRequest, NotificationScheduler};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 2025-05-27T12:00:00Z
const SIM_EPOCH_SECS: i64 = 1_748_347_200;

#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Move the clock by `by`. Returns the new time, or `None` (clock
    /// unchanged) if it would leave chrono's range.
    pub fn advance(&self, by: Duration) -> Option<DateTime<Utc>> {
        let mut now = lock(&self.now);
        *now = now.checked_add_signed(by)?;
        Some(*now)
    }

    pub fn advance_secs(&self, secs: i64) -> Option<DateTime<Utc>> {
        self.advance(Duration::try_seconds(secs)?)
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(DateTime::from_timestamp(SIM_EPOCH_SECS, 0).unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

#[derive(Debug, Default)]
struct SchedulerLog {
    scheduled: Vec<NotificationRequest>,
    cancelled: Vec<String>,
    pending: Option<NotificationRequest>,
    failure: Option<SchedulingError>,
}

/// Holds at most one pending request per id, like an OS notification center
/// restricted to the alarm.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    log: Arc<Mutex<SchedulerLog>>,
}

impl RecordingScheduler {
    /// Refuse every subsequent `schedule` with `err`.
    pub fn fail_with(&self, err: SchedulingError) {
        lock(&self.log).failure = Some(err);
    }

    pub fn succeed(&self) {
        lock(&self.log).failure = None;
    }

    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        lock(&self.log).scheduled.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        lock(&self.log).cancelled.clone()
    }

    pub fn pending(&self) -> Option<NotificationRequest> {
        lock(&self.log).pending.clone()
    }
}

impl NotificationScheduler for RecordingScheduler {
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), SchedulingError> {
        let mut log = lock(&self.log);
        if let Some(err) = log.failure.clone() {
            return Err(err);
        }
        log.scheduled.push(request.clone());
        log.pending = Some(request.clone());
        Ok(())
    }

    fn cancel(&mut self, id: &str) {
        let mut log = lock(&self.log);
        log.cancelled.push(id.to_string());
        if log.pending.as_ref().is_some_and(|p| p.id == id) {
            log.pending = None;
        }
    }
}

#[derive(Debug, Default)]
struct PlayerLog {
    play_calls: usize,
    stop_calls: usize,
    playing: bool,
    failure: Option<SoundError>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    log: Arc<Mutex<PlayerLog>>,
}

impl RecordingPlayer {
    /// Fail every subsequent `play` with `err`.
    pub fn fail_with(&self, err: SoundError) {
        lock(&self.log).failure = Some(err);
    }

    pub fn succeed(&self) {
        lock(&self.log).failure = None;
    }

    /// Every `play` invocation, failed ones included.
    pub fn play_calls(&self) -> usize {
        lock(&self.log).play_calls
    }

    pub fn stop_calls(&self) -> usize {
        lock(&self.log).stop_calls
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.log).playing
    }
}

impl LoopingSoundPlayer for RecordingPlayer {
    fn play(&mut self) -> Result<(), SoundError> {
        let mut log = lock(&self.log);
        log.play_calls += 1;
        if let Some(err) = log.failure.clone() {
            log.playing = false;
            return Err(err);
        }
        log.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut log = lock(&self.log);
        log.stop_calls += 1;
        log.playing = false;
    }
}
