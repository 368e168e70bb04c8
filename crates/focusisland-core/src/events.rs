use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::settings::Settings;
use crate::timer::TimerState;

/// Every published state change in the system produces an Event.
/// The presentation layer subscribes to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining_secs: u64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_secs: u64,
        display: String,
        progress: f64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// The timer was reloaded for a new current session (`None` when all done).
    SessionLoaded {
        session: Option<Session>,
        at: DateTime<Utc>,
    },
    SessionsChanged {
        sessions: Vec<Session>,
        current_index: usize,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session: Session,
        remaining_sessions: usize,
        at: DateTime<Utc>,
    },
    NotificationShown {
        message: String,
        finished: bool,
        at: DateTime<Utc>,
    },
    NotificationDismissed {
        at: DateTime<Utc>,
    },
    SettingsChanged {
        settings: Settings,
        at: DateTime<Utc>,
    },
    SettingsSaved {
        settings: Settings,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        state: TimerState,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        display: String,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::TimerPaused {
            remaining_secs: 42,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerPaused");
        assert_eq!(json["remaining_secs"], 42);
    }
}
