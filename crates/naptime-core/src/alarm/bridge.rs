//! Routing of host callbacks into the countdown engine and sound coordinator.
//!
//! The bridge is the single writer for both components: every host event
//! goes through [`NotificationLifecycleBridge::dispatch`], so the dedup latch
//! and the session phase are always updated together, whatever order the
//! host delivers ticks and notification callbacks in.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use super::engine::CountdownEngine;
use super::session::{AlarmPhase, SessionId};
use super::sound::{AlarmSoundCoordinator, SoundState};
use crate::error::Result;
use crate::events::Event;
use crate::platform::{Clock, LoopingSoundPlayer, NotificationScheduler};

/// Something the host observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Periodic UI tick (~1 Hz, irregular is fine).
    Tick,
    /// A notification arrived while the app was in the foreground.
    NotificationDelivered { identifier: String },
    /// The user tapped a presented notification.
    NotificationTapped { identifier: String },
}

/// How the host should present a notification delivered in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// No banner, no sound: the app plays its own alarm.
    Suppress,
    /// Banner and sound as the OS normally would.
    Default,
}

/// Outcome of one dispatched host event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// Set only for `NotificationDelivered`.
    pub presentation: Option<Presentation>,
    pub events: Vec<Event>,
}

/// What a countdown display needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmView {
    pub phase: AlarmPhase,
    /// `None` while idle.
    pub remaining_secs: Option<u64>,
}

impl Default for AlarmView {
    fn default() -> Self {
        Self {
            phase: AlarmPhase::Idle,
            remaining_secs: None,
        }
    }
}

pub struct NotificationLifecycleBridge<S, P, C> {
    engine: CountdownEngine<S, C>,
    sound: AlarmSoundCoordinator<P>,
    view: watch::Sender<AlarmView>,
}

impl<S, P, C> NotificationLifecycleBridge<S, P, C>
where
    S: NotificationScheduler,
    P: LoopingSoundPlayer,
    C: Clock,
{
    pub fn new(engine: CountdownEngine<S, C>, sound: AlarmSoundCoordinator<P>) -> Self {
        let (view, _) = watch::channel(AlarmView::default());
        let bridge = Self { engine, sound, view };
        bridge.publish();
        bridge
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> AlarmPhase {
        self.engine.phase()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.engine.remaining_secs()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.engine.session_id()
    }

    pub fn sound_state(&self) -> SoundState {
        self.sound.state()
    }

    pub fn is_sound_handled(&self) -> bool {
        self.sound.is_sound_handled()
    }

    pub fn engine(&self) -> &CountdownEngine<S, C> {
        &self.engine
    }

    pub fn sound(&self) -> &AlarmSoundCoordinator<P> {
        &self.sound
    }

    /// Last published view.
    pub fn view(&self) -> AlarmView {
        *self.view.borrow()
    }

    /// Receiver notified whenever the phase or remaining seconds change.
    pub fn subscribe(&self) -> watch::Receiver<AlarmView> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> Event {
        let session = self.engine.session();
        Event::StateSnapshot {
            phase: self.engine.phase(),
            session_id: session.map(|s| s.id),
            remaining_secs: self.engine.remaining_secs(),
            fires_at: session.map(|s| s.target),
            sound: self.sound.state(),
            sound_handled: self.sound.is_sound_handled(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Schedule a fresh alarm, tearing down whatever was there.
    ///
    /// An invalid duration leaves the current alarm untouched. If scheduling
    /// fails no session exists afterwards.
    pub fn start(&mut self, duration_secs: i64) -> Result<Vec<Event>> {
        self.engine.validate_duration(duration_secs)?;
        let mut events: Vec<Event> = self.stop().into_iter().collect();

        let scheduled = match self.engine.start(duration_secs) {
            Ok(event) => event,
            Err(err) => {
                self.publish();
                return Err(err);
            }
        };
        if let Some(id) = self.engine.session_id() {
            self.sound.begin_session(id);
        }
        self.publish();

        events.push(scheduled);
        Ok(events)
    }

    /// Dismiss the alarm from any phase. Safe when nothing is scheduled.
    pub fn stop(&mut self) -> Option<Event> {
        let session = self.engine.stop();
        let was_playing = self.sound.stop();
        self.publish();
        session.map(|s| Event::AlarmStopped {
            session_id: s.id,
            phase: s.phase,
            sound_was_playing: was_playing,
            at: Utc::now(),
        })
    }

    pub fn dispatch(&mut self, event: HostEvent) -> Dispatch {
        let mut out = Dispatch::default();
        match event {
            HostEvent::Tick => {
                if let Some(ev) = self.engine.refresh() {
                    let fired = match &ev {
                        Event::AlarmFired { session_id, .. } => Some(*session_id),
                        _ => None,
                    };
                    out.events.push(ev);
                    if let Some(id) = fired {
                        out.events.extend(self.sound.on_alarm_fired(id));
                    }
                }
            }
            HostEvent::NotificationDelivered { identifier } => {
                if self.is_alarm(&identifier) {
                    out.events.extend(self.engine.fire_now());
                    out.events
                        .extend(self.sound.on_notification_delivered_foreground());
                    out.presentation = Some(Presentation::Suppress);
                } else {
                    out.events.push(self.passed_through(identifier));
                    out.presentation = Some(Presentation::Default);
                }
            }
            HostEvent::NotificationTapped { identifier } => {
                if self.is_alarm(&identifier) {
                    out.events.extend(self.sound.on_notification_tapped());
                    out.events.extend(self.stop());
                } else {
                    out.events.push(self.passed_through(identifier));
                }
            }
        }
        self.publish();
        out
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_alarm(&self, identifier: &str) -> bool {
        identifier == self.engine.notification_id()
    }

    fn passed_through(&self, identifier: String) -> Event {
        debug!(%identifier, "notification is not the alarm, default presentation");
        Event::NotificationPassedThrough {
            identifier,
            at: Utc::now(),
        }
    }

    fn publish(&self) {
        let next = AlarmView {
            phase: self.engine.phase(),
            remaining_secs: self.engine.remaining_secs(),
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
