//! Countdown engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `refresh()` periodically.
//! Remaining time is derived from the session's absolute target on every
//! call, so a late or skipped refresh self-corrects.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> CountingDown -> Fired -> Idle
//!              |                    ^
//!              +------ stop() ------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(scheduler, SystemClock);
//! engine.start(600)?;
//! // In a loop:
//! engine.refresh(); // Returns Some(Event::AlarmFired) exactly once
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::session::{AlarmPhase, AlarmSession, SessionId};
use super::FireSource;
use crate::error::{AlarmError, Result};
use crate::events::Event;
use crate::platform::{Clock, NotificationRequest, NotificationScheduler};

/// Owns the single alarm session and its backing notification.
#[derive(Debug)]
pub struct CountdownEngine<S, C> {
    scheduler: S,
    clock: C,
    /// Content of the alarm notification; `after_secs` is filled per start.
    notification: NotificationRequest,
    session: Option<AlarmSession>,
    last_session_id: u64,
}

impl<S: NotificationScheduler, C: Clock> CountdownEngine<S, C> {
    pub fn new(scheduler: S, clock: C) -> Self {
        Self::with_notification(scheduler, clock, NotificationRequest::alarm(0))
    }

    pub fn with_notification(scheduler: S, clock: C, notification: NotificationRequest) -> Self {
        Self {
            scheduler,
            clock,
            notification,
            session: None,
            last_session_id: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> AlarmPhase {
        self.session
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(AlarmPhase::Idle)
    }

    pub fn session(&self) -> Option<&AlarmSession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Whole seconds left, floored. `None` when idle, `Some(0)` once fired.
    ///
    /// Never transitions; a countdown past its target still reads
    /// `CountingDown` until the next `refresh()`.
    pub fn remaining_secs(&self) -> Option<u64> {
        let now = self.clock.now();
        self.session.as_ref().map(|s| s.remaining_secs_at(now))
    }

    pub fn notification_id(&self) -> &str {
        &self.notification.id
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Check that `duration_secs` can back a session, without touching the
    /// current one.
    pub fn validate_duration(&self, duration_secs: i64) -> Result<()> {
        self.target_for(duration_secs).map(|_| ())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace any session with a new one due `duration_secs` from now.
    ///
    /// An invalid duration is rejected before anything is cancelled or
    /// scheduled. Otherwise the previous notification is cancelled first,
    /// and if the new one cannot be scheduled the engine is left idle: a
    /// countdown with no backing notification would be silent in the
    /// background.
    pub fn start(&mut self, duration_secs: i64) -> Result<Event> {
        let target = self.target_for(duration_secs)?;

        if let Some(prev) = self.session.take() {
            debug!(session = %prev.id, "replacing alarm session");
        }
        self.scheduler.cancel(&self.notification.id);

        let request = NotificationRequest {
            after_secs: duration_secs as u64,
            ..self.notification.clone()
        };
        if let Err(err) = self.scheduler.schedule(&request) {
            warn!(error = %err, "failed to schedule alarm notification");
            return Err(err.into());
        }

        self.last_session_id += 1;
        let id = SessionId(self.last_session_id);
        self.session = Some(AlarmSession {
            id,
            target,
            duration_secs: duration_secs as u64,
            phase: AlarmPhase::CountingDown,
        });
        info!(session = %id, duration_secs, fires_at = %target, "alarm scheduled");

        Ok(Event::AlarmScheduled {
            session_id: id,
            duration_secs: duration_secs as u64,
            fires_at: target,
            at: Utc::now(),
        })
    }

    /// Call periodically. Returns `Some(Event::AlarmFired)` on the one call
    /// that crosses the target, `Some(Event::CountdownTick)` while counting,
    /// `None` when idle or already fired.
    pub fn refresh(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let session = self.session.as_mut()?;
        if session.phase != AlarmPhase::CountingDown {
            return None;
        }

        if session.is_due_at(now) {
            session.phase = AlarmPhase::Fired;
            info!(session = %session.id, "alarm fired");
            return Some(Event::AlarmFired {
                session_id: session.id,
                source: FireSource::Countdown,
                at: Utc::now(),
            });
        }

        Some(Event::CountdownTick {
            session_id: session.id,
            remaining_secs: session.remaining_secs_at(now),
            at: Utc::now(),
        })
    }

    /// Mark a counting session as fired because the OS delivered its
    /// notification, even if the local clock has not reached the target yet.
    pub fn fire_now(&mut self) -> Option<Event> {
        let session = self.session.as_mut()?;
        if session.phase != AlarmPhase::CountingDown {
            return None;
        }
        session.phase = AlarmPhase::Fired;
        info!(session = %session.id, "alarm fired by notification delivery");
        Some(Event::AlarmFired {
            session_id: session.id,
            source: FireSource::Notification,
            at: Utc::now(),
        })
    }

    /// Back to `Idle` from any phase. Cancels the pending notification and
    /// returns the session that was active, if any.
    pub fn stop(&mut self) -> Option<AlarmSession> {
        self.scheduler.cancel(&self.notification.id);
        let session = self.session.take();
        if let Some(ref s) = session {
            info!(session = %s.id, phase = ?s.phase, "alarm stopped");
        }
        session
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Absolute instant a session of `duration_secs` would fire at.
    fn target_for(&self, duration_secs: i64) -> Result<DateTime<Utc>> {
        let invalid = AlarmError::InvalidDuration {
            seconds: duration_secs,
        };
        if duration_secs <= 0 {
            return Err(invalid);
        }
        Duration::try_seconds(duration_secs)
            .and_then(|length| self.clock.now().checked_add_signed(length))
            .ok_or(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulingError;
    use crate::sim::{ManualClock, RecordingScheduler};

    fn engine() -> (CountdownEngine<RecordingScheduler, ManualClock>, ManualClock, RecordingScheduler) {
        let clock = ManualClock::default();
        let scheduler = RecordingScheduler::default();
        let engine = CountdownEngine::new(scheduler.clone(), clock.clone());
        (engine, clock, scheduler)
    }

    #[test]
    fn start_enters_counting_down() {
        let (mut engine, _clock, scheduler) = engine();
        assert_eq!(engine.phase(), AlarmPhase::Idle);
        assert_eq!(engine.remaining_secs(), None);

        let event = engine.start(600).unwrap();
        assert!(matches!(event, Event::AlarmScheduled { duration_secs: 600, .. }));
        assert_eq!(engine.phase(), AlarmPhase::CountingDown);
        assert_eq!(engine.remaining_secs(), Some(600));
        assert_eq!(scheduler.pending().map(|r| r.after_secs), Some(600));
    }

    #[test]
    fn rejects_non_positive_duration_without_scheduling() {
        let (mut engine, _clock, scheduler) = engine();
        assert!(matches!(
            engine.start(0),
            Err(AlarmError::InvalidDuration { seconds: 0 })
        ));
        assert!(matches!(
            engine.start(-5),
            Err(AlarmError::InvalidDuration { seconds: -5 })
        ));
        assert_eq!(engine.phase(), AlarmPhase::Idle);
        assert!(scheduler.scheduled().is_empty());
        assert!(scheduler.cancelled().is_empty());
    }

    #[test]
    fn out_of_range_duration_keeps_running_session() {
        let (mut engine, _clock, scheduler) = engine();
        engine.start(600).unwrap();
        let running = engine.session_id();

        for seconds in [1_000_000_000_000_000, i64::MAX] {
            assert!(engine.validate_duration(seconds).is_err());
            assert!(matches!(
                engine.start(seconds),
                Err(AlarmError::InvalidDuration { .. })
            ));
        }
        assert_eq!(engine.session_id(), running);
        assert_eq!(engine.phase(), AlarmPhase::CountingDown);
        assert_eq!(scheduler.scheduled().len(), 1);
        assert_eq!(scheduler.cancelled().len(), 1);
        assert_eq!(scheduler.pending().map(|r| r.after_secs), Some(600));
        assert!(engine.validate_duration(600).is_ok());
    }

    #[test]
    fn scheduling_failure_leaves_engine_idle() {
        let (mut engine, _clock, scheduler) = engine();
        engine.start(300).unwrap();
        scheduler.fail_with(SchedulingError::PermissionDenied);

        let err = engine.start(600).unwrap_err();
        assert!(matches!(err, AlarmError::Scheduling(SchedulingError::PermissionDenied)));
        assert_eq!(engine.phase(), AlarmPhase::Idle);
        assert!(scheduler.pending().is_none());
    }

    #[test]
    fn restart_cancels_previous_notification() {
        let (mut engine, _clock, scheduler) = engine();
        engine.start(300).unwrap();
        let first = engine.session_id().unwrap();
        engine.start(600).unwrap();
        let second = engine.session_id().unwrap();

        assert!(second > first);
        assert_eq!(scheduler.cancelled().len(), 2);
        assert_eq!(scheduler.scheduled().len(), 2);
        assert_eq!(scheduler.pending().map(|r| r.after_secs), Some(600));
    }

    #[test]
    fn refresh_fires_once() {
        let (mut engine, clock, _scheduler) = engine();
        engine.start(5).unwrap();

        clock.advance_secs(3);
        assert!(matches!(
            engine.refresh(),
            Some(Event::CountdownTick { remaining_secs: 2, .. })
        ));

        clock.advance_secs(3);
        assert!(matches!(
            engine.refresh(),
            Some(Event::AlarmFired { source: FireSource::Countdown, .. })
        ));
        assert_eq!(engine.phase(), AlarmPhase::Fired);
        assert_eq!(engine.remaining_secs(), Some(0));

        clock.advance_secs(10);
        assert!(engine.refresh().is_none());
        assert!(engine.refresh().is_none());
    }

    #[test]
    fn fires_exactly_at_target() {
        let (mut engine, clock, _scheduler) = engine();
        engine.start(5).unwrap();
        clock.advance_secs(5);
        assert!(matches!(engine.refresh(), Some(Event::AlarmFired { .. })));
    }

    #[test]
    fn queries_do_not_transition() {
        let (mut engine, clock, _scheduler) = engine();
        engine.start(5).unwrap();
        clock.advance_secs(60);
        assert_eq!(engine.remaining_secs(), Some(0));
        assert_eq!(engine.phase(), AlarmPhase::CountingDown);
        assert!(matches!(engine.refresh(), Some(Event::AlarmFired { .. })));
    }

    #[test]
    fn fire_now_only_from_counting_down() {
        let (mut engine, _clock, _scheduler) = engine();
        assert!(engine.fire_now().is_none());
        engine.start(5).unwrap();
        assert!(matches!(
            engine.fire_now(),
            Some(Event::AlarmFired { source: FireSource::Notification, .. })
        ));
        assert!(engine.fire_now().is_none());
        assert!(engine.refresh().is_none());
    }

    #[test]
    fn stop_from_any_phase() {
        let (mut engine, clock, scheduler) = engine();
        assert!(engine.stop().is_none());

        engine.start(5).unwrap();
        assert!(engine.stop().is_some());
        assert_eq!(engine.phase(), AlarmPhase::Idle);
        assert!(scheduler.pending().is_none());

        engine.start(5).unwrap();
        clock.advance_secs(6);
        engine.refresh();
        let stopped = engine.stop().unwrap();
        assert_eq!(stopped.phase, AlarmPhase::Fired);
        assert_eq!(engine.remaining_secs(), None);
    }
}
