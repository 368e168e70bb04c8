//! Keeps the timer loaded with the current session.
//!
//! The orchestrator owns the [`SessionListState`] and the [`TimerEngine`] it
//! was constructed with. Every goal or settings mutation goes through it, so
//! a change to the current session reloads the timer right away (partial
//! progress is discarded). When a countdown ends the finished session is
//! removed and a [`Notification`] is raised; the next session is loaded only
//! after [`SessionOrchestrator::acknowledge`].

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::Result;
use crate::events::Event;
use crate::goal::{Goal, GoalId};
use crate::notification::{MessagePools, Notification};
use crate::session::{Session, SessionId};
use crate::session_list::{Regenerated, SessionListState};
use crate::settings::{Settings, SettingsEdit};
use crate::timer::TimerEngine;

pub struct SessionOrchestrator {
    list: SessionListState,
    timer: TimerEngine,
    pools: MessagePools,
    notification: Notification,
    /// Session the timer is currently loaded with.
    loaded: Option<SessionId>,
    /// A completion was handled and the next load waits for acknowledgment.
    awaiting_ack: bool,
    completed_tx: Sender<SessionId>,
    completed_rx: Receiver<SessionId>,
    rng: StdRng,
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("list", &self.list)
            .field("timer", &self.timer)
            .field("notification", &self.notification)
            .field("loaded", &self.loaded)
            .field("awaiting_ack", &self.awaiting_ack)
            .finish()
    }
}

impl SessionOrchestrator {
    /// Wire the collaborators together and load the first session.
    pub fn new(list: SessionListState, timer: TimerEngine, pools: MessagePools) -> Self {
        let (completed_tx, completed_rx) = mpsc::channel();
        let mut orchestrator = Self {
            list,
            timer,
            pools,
            notification: Notification::default(),
            loaded: None,
            awaiting_ack: false,
            completed_tx,
            completed_rx,
            rng: StdRng::from_entropy(),
        };
        orchestrator.load_current_session();
        orchestrator
    }

    /// Use a fixed random source for message selection.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn list(&self) -> &SessionListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut SessionListState {
        &mut self.list
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.list.current_session()
    }

    pub fn sessions(&self) -> &[Session] {
        self.list.sessions()
    }

    pub fn settings(&self) -> &Settings {
        self.list.settings()
    }

    pub fn is_awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Reset the timer to the current session and register its completion.
    ///
    /// With no current session the timer is reset to zero ("all done").
    pub fn load_current_session(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        events.extend(self.timer.pause());
        self.timer.clear_on_completion();
        self.awaiting_ack = false;

        let current = self.list.current_session().cloned();
        match &current {
            None => {
                events.push(self.timer.reset(Some(0)));
                self.loaded = None;
                debug!("no sessions left; timer cleared");
            }
            Some(session) => {
                events.push(self.timer.reset(Some(session.length_secs)));
                let id = session.id;
                let tx = self.completed_tx.clone();
                self.timer.set_on_completion(Box::new(move || {
                    // Receiver lives as long as the orchestrator.
                    let _ = tx.send(id);
                }));
                self.loaded = Some(id);
                debug!(title = %session.title, secs = session.length_secs, "session loaded");
            }
        }
        events.push(Event::SessionLoaded {
            session: current,
            at: Utc::now(),
        });
        events
    }

    /// Retire the current session and raise the end-of-session notification.
    pub fn handle_completion(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(done) = self.list.mark_current_complete() else {
            return events;
        };
        let remaining = self.list.sessions().len();
        let more_remaining = self.list.current_session().is_some();
        info!(title = %done.title, remaining, "session complete");

        let message = self.pools.pick(more_remaining, &mut self.rng);
        self.notification = Notification::show(message.clone());
        self.awaiting_ack = true;

        events.push(Event::SessionCompleted {
            session: done,
            remaining_sessions: remaining,
            at: Utc::now(),
        });
        events.push(Event::NotificationShown {
            message,
            finished: !more_remaining,
            at: Utc::now(),
        });
        events
    }

    /// Dismiss the notification and resume the session pipeline.
    pub fn acknowledge(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.notification.visible {
            self.notification.visible = false;
            events.push(Event::NotificationDismissed { at: Utc::now() });
        }
        if self.awaiting_ack {
            events.extend(self.load_current_session());
        }
        events
    }

    // ── Timer control ────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        self.timer.start().into_iter().collect()
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.timer.pause().into_iter().collect()
    }

    pub fn toggle(&mut self) -> Vec<Event> {
        self.timer.toggle().into_iter().collect()
    }

    /// Feed one tick to the timer and process any completion it caused.
    pub fn tick(&mut self, epoch: u64) -> Vec<Event> {
        let mut events = Vec::new();
        let before = self.timer.remaining_secs();
        match self.timer.tick(epoch) {
            Some(completed) => events.push(completed),
            None if self.timer.remaining_secs() != before => events.push(Event::TimerTicked {
                remaining_secs: self.timer.remaining_secs(),
                display: self.timer.display(),
                progress: self.timer.progress(),
                at: Utc::now(),
            }),
            None => {}
        }

        while let Ok(id) = self.completed_rx.try_recv() {
            if self.loaded == Some(id) && self.list.current_session().map(|s| s.id) == Some(id) {
                events.extend(self.handle_completion());
            } else {
                debug!(%id, "dropping completion for superseded session");
            }
        }
        events
    }

    // ── Goal and settings edits ──────────────────────────────────────

    pub fn set_goals(&mut self, goals: Vec<Goal>) -> Result<Vec<Event>> {
        let change = self.list.set_goals(goals)?;
        Ok(self.after_mutation(change))
    }

    pub fn add_goal(&mut self, title: &str, minutes: i64) -> Result<Vec<Event>> {
        let change = self.list.add_goal(title, minutes)?;
        Ok(self.after_mutation(change))
    }

    pub fn remove_goal(&mut self, id: GoalId) -> Result<Vec<Event>> {
        let change = self.list.remove_goal(id)?;
        Ok(self.after_mutation(change))
    }

    pub fn update_goal(&mut self, id: GoalId, title: &str, minutes: i64) -> Result<Vec<Event>> {
        let change = self.list.update_goal(id, title, minutes)?;
        Ok(self.after_mutation(change))
    }

    pub fn move_goal_up(&mut self, id: GoalId) -> Result<Vec<Event>> {
        let change = self.list.move_goal_up(id)?;
        Ok(self.after_mutation(change))
    }

    pub fn move_goal_down(&mut self, id: GoalId) -> Result<Vec<Event>> {
        let change = self.list.move_goal_down(id)?;
        Ok(self.after_mutation(change))
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<Vec<Event>> {
        let change = self.list.set_settings(settings)?;
        let mut events = vec![Event::SettingsChanged {
            settings,
            at: Utc::now(),
        }];
        events.extend(self.after_mutation(change));
        Ok(events)
    }

    pub fn edit_settings(&mut self, edit: SettingsEdit) -> Result<Vec<Event>> {
        let next = self.list.settings().apply(edit)?;
        self.set_settings(next)
    }

    fn after_mutation(&mut self, change: Regenerated) -> Vec<Event> {
        let mut events = vec![Event::SessionsChanged {
            sessions: self.list.sessions().to_vec(),
            current_index: self.list.current_index(),
            at: Utc::now(),
        }];
        if change.current_changed() {
            events.extend(self.load_current_session());
        }
        events
    }
}
