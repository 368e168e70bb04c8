//! Single-owner event loop around [`SessionOrchestrator`].
//!
//! Every UI command, timer tick and debounced save is a [`Command`] on one
//! tokio mpsc queue, processed one at a time. Tick tasks and debounce timers
//! hold only weak senders, so dropping every [`RuntimeHandle`] ends the loop.
//! Published state goes out as [`Event`]s on a broadcast channel.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::goal::{Goal, GoalId};
use crate::notification::Notification;
use crate::orchestrator::SessionOrchestrator;
use crate::session::Session;
use crate::session_list::{SessionListState, StateChange};
use crate::settings::{Settings, SettingsEdit};
use crate::storage::{AppConfig, SettingsStore};
use crate::timeline::{self, TimelineBlock};
use crate::timer::{Tick, TimerEngine, TimerState, TokioTicks};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum Command {
    AddGoal { title: String, minutes: i64 },
    RemoveGoal(GoalId),
    UpdateGoal { id: GoalId, title: String, minutes: i64 },
    MoveGoalUp(GoalId),
    MoveGoalDown(GoalId),
    SetGoals(Vec<Goal>),
    EditSettings(SettingsEdit),
    SetSettings(Settings),
    Start,
    Pause,
    Toggle,
    Acknowledge,
    Snapshot(oneshot::Sender<Snapshot>),
    Tick(Tick),
    /// Settings changed; schedule a debounced save.
    SettingsDirty,
    /// Debounce elapsed for the given save generation.
    FlushSettings { generation: u64 },
    Shutdown,
}

/// Timer fields the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub state: TimerState,
    pub is_running: bool,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub progress: f64,
    pub display: String,
}

/// Everything observable at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub goals: Vec<Goal>,
    pub settings: Settings,
    pub sessions: Vec<Session>,
    pub current_index: usize,
    pub current: Option<Session>,
    pub timer: TimerView,
    pub notification: Notification,
    pub timeline: Vec<TimelineBlock>,
}

impl Snapshot {
    pub fn of(orchestrator: &SessionOrchestrator, window: chrono::Duration) -> Self {
        let list = orchestrator.list();
        let timer = orchestrator.timer();
        Self {
            goals: list.goals().to_vec(),
            settings: *list.settings(),
            sessions: list.sessions().to_vec(),
            current_index: list.current_index(),
            current: list.current_session().cloned(),
            timer: TimerView {
                state: timer.state(),
                is_running: timer.is_running(),
                remaining_secs: timer.remaining_secs(),
                total_secs: timer.total_secs(),
                progress: timer.progress(),
                display: timer.display(),
            },
            notification: orchestrator.notification().clone(),
            timeline: timeline::project(
                list.sessions(),
                list.current_index(),
                timer.remaining_secs(),
                Utc::now(),
                window,
            ),
        }
    }
}

/// Cloneable front door to a running [`FocusRuntime`].
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<Event>,
}

impl RuntimeHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::RuntimeClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn add_goal(&self, title: impl Into<String>, minutes: i64) -> Result<()> {
        self.send(Command::AddGoal {
            title: title.into(),
            minutes,
        })
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle)
    }

    pub fn acknowledge(&self) -> Result<()> {
        self.send(Command::Acknowledge)
    }

    pub fn edit_settings(&self, edit: SettingsEdit) -> Result<()> {
        self.send(Command::EditSettings(edit))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)
    }
}

pub struct FocusRuntime {
    orchestrator: SessionOrchestrator,
    store: Box<dyn SettingsStore>,
    config: AppConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    weak_tx: mpsc::WeakUnboundedSender<Command>,
    events: broadcast::Sender<Event>,
    save_generation: u64,
    save_pending: bool,
}

impl FocusRuntime {
    /// Build the runtime with settings loaded from `store`.
    ///
    /// # Errors
    /// Fails if the loaded settings cannot drive generation.
    pub fn new(
        goals: Vec<Goal>,
        store: impl SettingsStore + 'static,
        config: AppConfig,
    ) -> Result<(Self, RuntimeHandle)> {
        let settings = store.load();
        Self::with_settings(goals, settings, store, config)
    }

    /// Build the runtime with `settings` in place of the stored record.
    ///
    /// The store is only written once settings are edited.
    ///
    /// # Errors
    /// Fails if `settings` are invalid or cannot drive generation.
    pub fn with_settings(
        goals: Vec<Goal>,
        settings: Settings,
        store: impl SettingsStore + 'static,
        config: AppConfig,
    ) -> Result<(Self, RuntimeHandle)> {
        settings.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let weak_tx = tx.downgrade();

        let mut list = SessionListState::new(goals, settings)?;

        let dirty_tx = weak_tx.clone();
        list.subscribe(Box::new(move |change| {
            if let StateChange::SettingsChanged(_) = change {
                if let Some(tx) = dirty_tx.upgrade() {
                    let _ = tx.send(Command::SettingsDirty);
                }
            }
        }));

        let tick_tx = weak_tx.clone();
        let ticks = TokioTicks::new(move |tick| {
            tick_tx
                .upgrade()
                .is_some_and(|tx| tx.send(Command::Tick(tick)).is_ok())
        });

        let orchestrator = SessionOrchestrator::new(
            list,
            TimerEngine::new(ticks),
            config.messages.clone(),
        );

        let runtime = Self {
            orchestrator,
            store: Box::new(store),
            config,
            commands: rx,
            weak_tx,
            events: events.clone(),
            save_generation: 0,
            save_pending: false,
        };
        Ok((runtime, RuntimeHandle { commands: tx, events }))
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.orchestrator
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(
            sessions = self.orchestrator.sessions().len(),
            "focus runtime started"
        );
        while let Some(command) = self.commands.recv().await {
            if let Command::Shutdown = command {
                break;
            }
            self.handle(command);
        }
        // Edits handled just before shutdown queue their dirty mark behind it.
        while let Ok(command) = self.commands.try_recv() {
            if let Command::SettingsDirty = command {
                self.save_pending = true;
            }
        }
        self.orchestrator.pause();
        if self.save_pending {
            self.save_settings();
        }
        info!("focus runtime stopped");
    }

    fn handle(&mut self, command: Command) {
        let result = match command {
            Command::AddGoal { title, minutes } => self.orchestrator.add_goal(&title, minutes),
            Command::RemoveGoal(id) => self.orchestrator.remove_goal(id),
            Command::UpdateGoal { id, title, minutes } => {
                self.orchestrator.update_goal(id, &title, minutes)
            }
            Command::MoveGoalUp(id) => self.orchestrator.move_goal_up(id),
            Command::MoveGoalDown(id) => self.orchestrator.move_goal_down(id),
            Command::SetGoals(goals) => self.orchestrator.set_goals(goals),
            Command::EditSettings(edit) => self.orchestrator.edit_settings(edit),
            Command::SetSettings(settings) => self.orchestrator.set_settings(settings),
            Command::Start => Ok(self.orchestrator.start()),
            Command::Pause => Ok(self.orchestrator.pause()),
            Command::Toggle => Ok(self.orchestrator.toggle()),
            Command::Acknowledge => {
                let was_awaiting = self.orchestrator.is_awaiting_ack();
                let mut events = self.orchestrator.acknowledge();
                let loaded_next = events.iter().any(|e| {
                    matches!(e, Event::SessionLoaded { session: Some(_), .. })
                });
                if self.config.auto_start_after_ack && was_awaiting && loaded_next {
                    events.extend(self.orchestrator.start());
                }
                Ok(events)
            }
            Command::Tick(tick) => Ok(self.orchestrator.tick(tick.epoch)),
            Command::Snapshot(reply) => {
                let _ = reply.send(Snapshot::of(
                    &self.orchestrator,
                    self.config.timeline_window(),
                ));
                Ok(Vec::new())
            }
            Command::SettingsDirty => {
                self.schedule_save();
                Ok(Vec::new())
            }
            Command::FlushSettings { generation } => {
                if self.save_pending && generation == self.save_generation {
                    Ok(self.save_settings())
                } else {
                    Ok(Vec::new())
                }
            }
            Command::Shutdown => Ok(Vec::new()),
        };

        match result {
            Ok(events) => self.publish(events),
            Err(e) => warn!(error = %e, "command rejected"),
        }
    }

    fn publish(&self, events: Vec<Event>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn schedule_save(&mut self) {
        self.save_generation += 1;
        self.save_pending = true;
        let generation = self.save_generation;
        let delay = self.config.save_debounce();
        let weak = self.weak_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = weak.upgrade() {
                let _ = tx.send(Command::FlushSettings { generation });
            }
        });
    }

    fn save_settings(&mut self) -> Vec<Event> {
        self.save_pending = false;
        let settings = *self.orchestrator.settings();
        match self.store.save(&settings) {
            Ok(()) => {
                debug!(?settings, "settings saved");
                vec![Event::SettingsSaved {
                    settings,
                    at: Utc::now(),
                }]
            }
            Err(e) => {
                warn!(error = %e, "failed to save settings");
                Vec::new()
            }
        }
    }
}
