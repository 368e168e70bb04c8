//! Goal list, derived session list and the current-session pointer.
//!
//! Every goal or settings mutation is applied in full and then followed by a
//! single regeneration, so observers never see a half-applied edit.
//!
//! Sessions get fresh ids on every regeneration. Callers that need to know
//! whether "the current session" changed must compare through
//! [`Regenerated::current_changed`], never assume id continuity.

use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::generator;
use crate::goal::{Goal, GoalId};
use crate::session::{Session, SessionId};
use crate::settings::Settings;

/// Emitted to subscribers after each atomic mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    GoalsChanged,
    SettingsChanged(Settings),
    SessionCompleted(Session),
    CurrentSessionChanged {
        previous: Option<SessionId>,
        current: Option<Session>,
    },
}

pub type Listener = Box<dyn FnMut(&StateChange) + Send>;

/// Handle returned by [`SessionListState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

/// Before/after view of the current session across a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Regenerated {
    pub previous: Option<Session>,
    pub current: Option<Session>,
}

impl Regenerated {
    fn unchanged(current: Option<&Session>) -> Self {
        Self {
            previous: current.cloned(),
            current: current.cloned(),
        }
    }

    /// Identity, title or length of the current session differs, or a
    /// session appeared/disappeared.
    pub fn current_changed(&self) -> bool {
        match (&self.previous, &self.current) {
            (None, None) => false,
            (Some(a), Some(b)) => !a.same_slot(b),
            _ => true,
        }
    }
}

pub struct SessionListState {
    goals: Vec<Goal>,
    settings: Settings,
    sessions: Vec<Session>,
    current_index: usize,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: usize,
}

impl std::fmt::Debug for SessionListState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionListState")
            .field("goals", &self.goals)
            .field("settings", &self.settings)
            .field("sessions", &self.sessions.len())
            .field("current_index", &self.current_index)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SessionListState {
    /// Create the state and generate the initial session list.
    ///
    /// # Errors
    /// Fails if `settings` cannot drive generation.
    pub fn new(goals: Vec<Goal>, settings: Settings) -> Result<Self> {
        let sessions = generator::generate(&goals, &settings)?;
        Ok(Self {
            goals,
            settings,
            sessions,
            current_index: 0,
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Remaining sessions in timeline order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.sessions.get(self.current_index)
    }

    pub fn is_first(&self, id: GoalId) -> bool {
        self.goals.first().map(|g| g.id) == Some(id)
    }

    pub fn is_last(&self, id: GoalId) -> bool {
        self.goals.last().map(|g| g.id) == Some(id)
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    // ── Goal CRUD ────────────────────────────────────────────────────

    /// Replace the whole goal list in one step.
    pub fn set_goals(&mut self, goals: Vec<Goal>) -> Result<Regenerated> {
        self.goals = goals;
        self.notify(&StateChange::GoalsChanged);
        self.regenerate()
    }

    /// # Errors
    /// Rejects an empty title or non-positive minutes without touching state.
    pub fn add_goal(&mut self, title: &str, minutes: i64) -> Result<Regenerated> {
        let goal = Goal::new(title, minutes)?;
        debug!(title = %goal.title, minutes = goal.minutes, "adding goal");
        self.goals.push(goal);
        self.notify(&StateChange::GoalsChanged);
        self.regenerate()
    }

    pub fn remove_goal(&mut self, id: GoalId) -> Result<Regenerated> {
        let idx = self.position(id)?;
        self.goals.remove(idx);
        self.notify(&StateChange::GoalsChanged);
        self.regenerate()
    }

    pub fn update_goal(&mut self, id: GoalId, title: &str, minutes: i64) -> Result<Regenerated> {
        let idx = self.position(id)?;
        self.goals[idx].edit(title, minutes)?;
        self.notify(&StateChange::GoalsChanged);
        self.regenerate()
    }

    /// Swap with the previous goal. Resets the current index to 0.
    ///
    /// No-op for the first goal.
    pub fn move_goal_up(&mut self, id: GoalId) -> Result<Regenerated> {
        let idx = self.position(id)?;
        if idx == 0 {
            return Ok(Regenerated::unchanged(self.current_session()));
        }
        self.goals.swap(idx, idx - 1);
        self.after_reorder()
    }

    /// Swap with the next goal. Resets the current index to 0.
    ///
    /// No-op for the last goal.
    pub fn move_goal_down(&mut self, id: GoalId) -> Result<Regenerated> {
        let idx = self.position(id)?;
        if idx + 1 >= self.goals.len() {
            return Ok(Regenerated::unchanged(self.current_session()));
        }
        self.goals.swap(idx, idx + 1);
        self.after_reorder()
    }

    /// # Errors
    /// Settings that fail [`Settings::validate`] are rejected unchanged.
    pub fn set_settings(&mut self, settings: Settings) -> Result<Regenerated> {
        settings.validate()?;
        self.settings = settings;
        self.notify(&StateChange::SettingsChanged(settings));
        self.regenerate()
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Rebuild sessions from goals and settings.
    pub fn regenerate(&mut self) -> Result<Regenerated> {
        let previous = self.current_session().cloned();
        self.sessions = generator::generate(&self.goals, &self.settings)?;
        self.current_index = self
            .current_index
            .min(self.sessions.len().saturating_sub(1));

        let change = Regenerated {
            previous,
            current: self.current_session().cloned(),
        };
        if change.current_changed() {
            debug!(
                current = ?change.current.as_ref().map(|s| s.title.as_str()),
                "current session changed"
            );
            self.notify(&StateChange::CurrentSessionChanged {
                previous: change.previous.as_ref().map(|s| s.id),
                current: change.current.clone(),
            });
        }
        Ok(change)
    }

    /// Drop the current session; the next one shifts into its slot.
    ///
    /// Returns the removed session, or `None` when the list is exhausted.
    pub fn mark_current_complete(&mut self) -> Option<Session> {
        if self.current_index >= self.sessions.len() {
            return None;
        }
        let mut done = self.sessions.remove(self.current_index);
        done.completed = true;
        self.current_index = self.current_index.min(self.sessions.len());
        self.notify(&StateChange::SessionCompleted(done.clone()));
        Some(done)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn position(&self, id: GoalId) -> Result<usize> {
        self.goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| ValidationError::GoalNotFound(id.to_string()).into())
    }

    fn after_reorder(&mut self) -> Result<Regenerated> {
        self.current_index = 0;
        self.notify(&StateChange::GoalsChanged);
        self.regenerate()
    }

    fn notify(&mut self, change: &StateChange) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(change);
        }
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }
}
