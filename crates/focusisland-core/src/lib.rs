//! # FocusIsland Core Library
//!
//! Turns a short list of work goals into an ordered run of focus and break
//! sessions, and counts the current session down. The CLI (and any GUI shell)
//! is a thin layer that sends commands and renders published state.
//!
//! ## Architecture
//!
//! - **Generator**: pure goals + settings → sessions
//! - **Session list**: goal CRUD, regeneration, the current-session pointer
//! - **Timer Engine**: one-second countdown with cancellable tick sources
//! - **Orchestrator**: reloads the timer when the current session changes and
//!   raises end-of-session notifications
//! - **Runtime**: tokio single-owner loop serializing commands and ticks
//! - **Storage**: SQLite key-value settings record and TOML app configuration
//!
//! ## Key Components
//!
//! - [`generate`]: Session generation
//! - [`SessionListState`]: Derived session list state
//! - [`TimerEngine`]: Countdown state machine
//! - [`SessionOrchestrator`]: Session/timer glue
//! - [`FocusRuntime`]: Async event loop

pub mod error;
pub mod events;
pub mod generator;
pub mod goal;
pub mod notification;
pub mod orchestrator;
pub mod runtime;
pub mod session;
pub mod session_list;
pub mod settings;
pub mod storage;
pub mod timeline;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use generator::generate;
pub use goal::{parse_goal_spec, Goal, GoalId, MAX_GOAL_MINUTES};
pub use notification::{MessagePools, Notification};
pub use orchestrator::SessionOrchestrator;
pub use runtime::{Command, FocusRuntime, RuntimeHandle, Snapshot, TimerView};
pub use session::{Session, SessionId, SessionKind};
pub use session_list::{Regenerated, SessionListState, StateChange};
pub use settings::{Settings, SettingsEdit};
pub use storage::{AppConfig, Database, KvSettingsStore, MemorySettingsStore, SettingsStore};
pub use timeline::TimelineBlock;
pub use timer::{ManualTicks, TimerEngine, TimerState, TokioTicks};
