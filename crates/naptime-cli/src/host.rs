//! Terminal stand-ins for the OS services the alarm core needs.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use naptime_core::{
    LoopingSoundPlayer, NotificationRequest, NotificationScheduler, SchedulingError, SoundError,
};
use tokio::time::{Duration, Instant};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
pub struct PendingNotification {
    pub request: NotificationRequest,
    pub due: Instant,
}

/// In-process notification center: remembers one pending request and when
/// it is due. The run loop delivers it.
#[derive(Debug, Clone)]
pub struct TerminalScheduler {
    authorized: bool,
    pending: Arc<Mutex<Option<PendingNotification>>>,
}

impl TerminalScheduler {
    pub fn new(authorized: bool) -> Self {
        Self {
            authorized,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn due_at(&self) -> Option<Instant> {
        lock(&self.pending).as_ref().map(|p| p.due)
    }

    /// Remove and return the pending request if it is due.
    pub fn take_due(&self) -> Option<NotificationRequest> {
        let mut pending = lock(&self.pending);
        if pending.as_ref().is_some_and(|p| p.due <= Instant::now()) {
            pending.take().map(|p| p.request)
        } else {
            None
        }
    }
}

impl NotificationScheduler for TerminalScheduler {
    fn schedule(&mut self, request: &NotificationRequest) -> Result<(), SchedulingError> {
        if !self.authorized {
            return Err(SchedulingError::PermissionDenied);
        }
        let due = Instant::now()
            .checked_add(Duration::from_secs(request.after_secs))
            .ok_or_else(|| {
                SchedulingError::Rejected(format!("{}s is too far ahead", request.after_secs))
            })?;
        *lock(&self.pending) = Some(PendingNotification {
            request: request.clone(),
            due,
        });
        Ok(())
    }

    fn cancel(&mut self, id: &str) {
        let mut pending = lock(&self.pending);
        if pending.as_ref().is_some_and(|p| p.request.id == id) {
            *pending = None;
        }
    }
}

/// Rings the terminal bell on every tick while playing.
///
/// If a sound file was given it must exist, mirroring a bundled resource
/// that failed to load.
#[derive(Debug, Clone)]
pub struct TerminalBell {
    sound: Option<PathBuf>,
    ringing: Arc<AtomicBool>,
}

impl TerminalBell {
    pub fn new(sound: Option<PathBuf>) -> Self {
        Self {
            sound,
            ringing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_ringing(&self) -> bool {
        self.ringing.load(Ordering::SeqCst)
    }

    pub fn ring(&self) {
        let mut err = std::io::stderr();
        let _ = err.write_all(b"\x07");
        let _ = err.flush();
    }
}

impl LoopingSoundPlayer for TerminalBell {
    fn play(&mut self) -> Result<(), SoundError> {
        if let Some(path) = &self.sound {
            if !path.is_file() {
                return Err(SoundError::ResourceMissing(path.display().to_string()));
            }
        }
        self.ringing.store(true, Ordering::SeqCst);
        self.ring();
        Ok(())
    }

    fn stop(&mut self) {
        self.ringing.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unauthorized_scheduler_refuses() {
        let mut scheduler = TerminalScheduler::new(false);
        let err = scheduler
            .schedule(&NotificationRequest::alarm(5))
            .unwrap_err();
        assert_eq!(err, SchedulingError::PermissionDenied);
        assert!(scheduler.due_at().is_none());
    }

    #[tokio::test]
    async fn cancel_clears_pending() {
        let mut scheduler = TerminalScheduler::new(true);
        scheduler.schedule(&NotificationRequest::alarm(5)).unwrap();
        assert!(scheduler.due_at().is_some());
        assert!(scheduler.take_due().is_none());
        scheduler.cancel(naptime_core::ALARM_NOTIFICATION_ID);
        assert!(scheduler.due_at().is_none());
    }

    #[tokio::test]
    async fn unreachable_deadline_is_rejected() {
        let mut scheduler = TerminalScheduler::new(true);
        let err = scheduler
            .schedule(&NotificationRequest::alarm(u64::MAX))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Rejected(_)));
        assert!(scheduler.due_at().is_none());
    }

    #[test]
    fn bell_with_missing_file_fails() {
        let mut bell = TerminalBell::new(Some(PathBuf::from("/nonexistent/alarm.wav")));
        assert!(matches!(bell.play(), Err(SoundError::ResourceMissing(_))));
        assert!(!bell.is_ringing());
    }

    #[test]
    fn bell_clones_share_state() {
        let mut bell = TerminalBell::new(None);
        let handle = bell.clone();
        bell.play().unwrap();
        assert!(handle.is_ringing());
        bell.stop();
        assert!(!handle.is_ringing());
    }
}
