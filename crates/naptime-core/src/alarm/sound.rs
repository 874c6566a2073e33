//! Looping alarm sound with per-session dedup.
//!
//! Three independent paths may try to start the sound for the same session:
//! the local countdown firing, the OS delivering the notification while the
//! app is in the foreground, and the user tapping a notification the OS
//! already presented (and already played its own sound for). The first one
//! to reach the coordinator latches `sound_handled`; the rest become no-ops.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::session::SessionId;
use crate::events::Event;
use crate::platform::LoopingSoundPlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundState {
    Playing,
    Stopped,
}

/// Which path asked for the sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundTrigger {
    LocalFire,
    ForegroundDelivery,
    BackgroundTap,
}

#[derive(Debug)]
pub struct AlarmSoundCoordinator<P> {
    player: P,
    state: SoundState,
    /// Latched once any path started (or deliberately skipped) the sound for
    /// `session`. Cleared only by `begin_session` and `stop`.
    sound_handled: bool,
    session: Option<SessionId>,
}

impl<P: LoopingSoundPlayer> AlarmSoundCoordinator<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            state: SoundState::Stopped,
            sound_handled: false,
            session: None,
        }
    }

    pub fn state(&self) -> SoundState {
        self.state
    }

    pub fn is_sound_handled(&self) -> bool {
        self.sound_handled
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Full reset for a brand-new session.
    pub fn begin_session(&mut self, id: SessionId) {
        self.stop();
        self.session = Some(id);
    }

    /// The countdown for `id` reached zero.
    pub fn on_alarm_fired(&mut self, id: SessionId) -> Option<Event> {
        if self.session != Some(id) {
            debug!(session = %id, "ignoring fire for inactive session");
            return None;
        }
        self.start_once(SoundTrigger::LocalFire)
    }

    /// The OS delivered the alarm notification while we are in the
    /// foreground; its own banner and sound are suppressed, so ours is the
    /// only audible cue.
    pub fn on_notification_delivered_foreground(&mut self) -> Option<Event> {
        self.start_once(SoundTrigger::ForegroundDelivery)
    }

    /// The user tapped a notification the OS already presented with sound.
    /// Latches without playing. The caller stops the countdown.
    pub fn on_notification_tapped(&mut self) -> Option<Event> {
        let id = self.session?;
        if self.sound_handled {
            debug!(session = %id, "tap after sound already handled");
            return None;
        }
        self.sound_handled = true;
        info!(session = %id, "sound already played by notification, not looping");
        Some(Event::SoundSuppressed {
            session_id: id,
            trigger: SoundTrigger::BackgroundTap,
            at: Utc::now(),
        })
    }

    /// Stop the sound if playing and forget the session. Returns whether the
    /// sound was playing.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.state == SoundState::Playing;
        if was_playing {
            self.player.stop();
            self.state = SoundState::Stopped;
            info!("alarm sound stopped");
        }
        self.sound_handled = false;
        self.session = None;
        was_playing
    }

    fn start_once(&mut self, trigger: SoundTrigger) -> Option<Event> {
        let Some(id) = self.session else {
            debug!(?trigger, "no active alarm session, not starting sound");
            return None;
        };
        if self.sound_handled {
            debug!(session = %id, ?trigger, "sound already handled");
            return None;
        }

        match self.player.play() {
            Ok(()) => {
                self.state = SoundState::Playing;
                self.sound_handled = true;
                info!(session = %id, ?trigger, "alarm sound started");
                Some(Event::SoundStarted {
                    session_id: id,
                    trigger,
                    at: Utc::now(),
                })
            }
            Err(err) => {
                // Left unlatched so a later path can retry.
                self.state = SoundState::Stopped;
                warn!(session = %id, ?trigger, error = %err, "alarm sound failed to start");
                Some(Event::SoundFailed {
                    session_id: id,
                    trigger,
                    message: err.to_string(),
                    at: Utc::now(),
                })
            }
        }
    }
}
