use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Title shared by every break session.
pub const BREAK_TITLE: &str = "Break";

const CHUNK_MARKER: &str = ", Session ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Focus,
    Break,
}

/// Opaque session identifier. Fresh on every regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One indivisible block of focus or break time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    /// Length in seconds.
    pub length_secs: u64,
    #[serde(default)]
    pub completed: bool,
    pub kind: SessionKind,
}

impl Session {
    pub fn focus(goal_title: &str, chunk_index: u32, minutes: u32) -> Self {
        Self {
            id: SessionId::new(),
            title: format!("{goal_title}{CHUNK_MARKER}{chunk_index}"),
            length_secs: minutes_to_secs(minutes),
            completed: false,
            kind: SessionKind::Focus,
        }
    }

    pub fn rest(minutes: u32) -> Self {
        Self {
            id: SessionId::new(),
            title: BREAK_TITLE.to_string(),
            length_secs: minutes_to_secs(minutes),
            completed: false,
            kind: SessionKind::Break,
        }
    }

    pub fn is_break(&self) -> bool {
        self.kind == SessionKind::Break
    }

    pub fn length_min(&self) -> u64 {
        self.length_secs / 60
    }

    /// Title without the `", Session N"` chunk suffix.
    pub fn display_title(&self) -> &str {
        match self.title.rsplit_once(CHUNK_MARKER) {
            Some((base, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => base,
            _ => &self.title,
        }
    }

    /// Whether `other` would be seen as the same current session by the timer:
    /// same identity, title and length.
    pub fn same_slot(&self, other: &Session) -> bool {
        self.id == other.id && self.title == other.title && self.length_secs == other.length_secs
    }
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_session_title_and_length() {
        let s = Session::focus("Write", 2, 20);
        assert_eq!(s.title, "Write, Session 2");
        assert_eq!(s.length_secs, 1200);
        assert_eq!(s.kind, SessionKind::Focus);
        assert!(!s.completed);
    }

    #[test]
    fn display_title_strips_chunk_suffix() {
        assert_eq!(Session::focus("Write", 12, 20).display_title(), "Write");
        assert_eq!(Session::rest(10).display_title(), "Break");

        let mut odd = Session::rest(5);
        odd.title = "Notes, Session two".into();
        assert_eq!(odd.display_title(), "Notes, Session two");
    }

    #[test]
    fn same_slot_compares_identity_title_and_length() {
        let a = Session::focus("A", 1, 10);
        let mut b = a.clone();
        assert!(a.same_slot(&b));
        b.length_secs += 60;
        assert!(!a.same_slot(&b));
        assert!(!a.same_slot(&Session::focus("A", 1, 10)));
    }
}
