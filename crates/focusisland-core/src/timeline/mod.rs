//! Wall-clock projection of the remaining sessions.
//!
//! The current session is anchored so that its elapsed part lies in the past:
//! `anchor = now - (length - remaining)`. Following sessions are laid end to
//! end from there, up to a display window (8 hours by default).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionKind};

/// Default look-ahead for [`project`].
pub const DEFAULT_WINDOW_HOURS: i64 = 8;

/// One session placed on the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBlock {
    /// Title without the chunk suffix.
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_current: bool,
    pub kind: SessionKind,
}

impl TimelineBlock {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Place `sessions[current_index..]` on the clock.
///
/// `remaining_secs` is what the timer has left on the current session; it is
/// ignored when there is no current session.
pub fn project(
    sessions: &[Session],
    current_index: usize,
    remaining_secs: u64,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<TimelineBlock> {
    let upcoming = sessions.get(current_index..).unwrap_or_default();

    let anchor = match upcoming.first() {
        Some(current) => {
            let elapsed = current.length_secs.saturating_sub(remaining_secs);
            now - secs(elapsed)
        }
        None => now,
    };
    let horizon = anchor + window;

    let mut blocks = Vec::new();
    let mut cursor = anchor;
    for (idx, session) in upcoming.iter().enumerate() {
        let start = cursor;
        let end = cursor + secs(session.length_secs);
        if start >= horizon {
            break;
        }
        cursor = end;
        if end <= anchor {
            continue;
        }
        blocks.push(TimelineBlock {
            title: session.display_title().to_string(),
            start,
            end,
            is_current: idx == 0,
            kind: session.kind,
        });
    }
    blocks
}

fn secs(value: u64) -> Duration {
    // Session lengths come from u32 minutes, far inside chrono's range.
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::goal::Goal;
    use crate::settings::Settings;

    fn sessions() -> Vec<Session> {
        let goals = vec![Goal::new("A", 15).unwrap(), Goal::new("B", 10).unwrap()];
        generate(&goals, &Settings::default()).unwrap()
    }

    #[test]
    fn anchors_current_session_in_the_past() {
        let now = Utc::now();
        let blocks = project(&sessions(), 0, 600, now, Duration::hours(8));
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].start, now - Duration::seconds(300));
        assert_eq!(blocks[0].end, now + Duration::seconds(600));
        assert!(blocks[0].is_current);
        assert_eq!(blocks[0].title, "A");
        assert_eq!(blocks[1].start, blocks[0].end);
        assert_eq!(blocks[1].kind, SessionKind::Break);
        assert!(!blocks[1].is_current);
    }

    #[test]
    fn starts_from_current_index() {
        let now = Utc::now();
        let list = sessions();
        let blocks = project(&list, 2, list[2].length_secs, now, Duration::hours(8));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "B");
        assert_eq!(blocks[0].start, now);
    }

    #[test]
    fn stops_at_window() {
        let now = Utc::now();
        let list = sessions();
        // A (15m) + break (13m) = 28 minutes; B starts at 28m.
        let blocks = project(&list, 0, list[0].length_secs, now, Duration::minutes(28));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].duration(), Duration::minutes(13));
    }

    #[test]
    fn empty_list_projects_nothing() {
        assert!(project(&[], 0, 0, Utc::now(), Duration::hours(8)).is_empty());
        assert!(project(&sessions(), 9, 0, Utc::now(), Duration::hours(8)).is_empty());
    }
}
