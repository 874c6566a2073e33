mod bridge;
mod engine;
mod session;
mod sound;

use serde::{Deserialize, Serialize};

pub use bridge::{AlarmView, Dispatch, HostEvent, NotificationLifecycleBridge, Presentation};
pub use engine::CountdownEngine;
pub use session::{AlarmPhase, AlarmSession, SessionId};
pub use sound::{AlarmSoundCoordinator, SoundState, SoundTrigger};

/// What moved a session into `Fired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireSource {
    /// A refresh observed the target instant had passed.
    Countdown,
    /// The OS delivered the alarm notification first.
    Notification,
}
