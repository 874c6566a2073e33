use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one alarm session.
///
/// Ids are handed out in increasing order by the countdown engine, so a
/// trigger carrying an older id can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmPhase {
    Idle,
    CountingDown,
    Fired,
}

/// The single active alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSession {
    pub id: SessionId,
    /// Absolute instant the alarm is due. Remaining time is always derived
    /// from this, never decremented.
    pub target: DateTime<Utc>,
    pub duration_secs: u64,
    pub phase: AlarmPhase,
}

impl AlarmSession {
    /// Whole seconds left at `now`, floored and clamped at zero.
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        if self.phase == AlarmPhase::Fired {
            return 0;
        }
        (self.target - now).num_seconds().max(0) as u64
    }

    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.target <= now
    }
}
