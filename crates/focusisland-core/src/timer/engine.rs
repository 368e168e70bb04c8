//! Timer engine implementation.
//!
//! A countdown for one session at a time, counted in whole seconds.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           +-- remaining hits 0 --> Paused (completion fires once)
//! reset(..) from any state -> Idle
//! ```
//!
//! Ticks come from a [`TickScheduler`]. Each `start()` registers a new tick
//! source under a fresh epoch; `pause()`, `reset()` and completion drop it.
//! [`TimerEngine::tick`] ignores ticks from any other epoch.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(ManualTicks);
//! engine.reset(Some(20 * 60));
//! engine.set_on_completion(Box::new(|| println!("done")));
//! engine.start();
//! engine.tick(engine.epoch()); // Returns Some(Event) when the countdown ends
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::ticker::{TickHandle, TickScheduler};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not started since the last reset; remaining == total.
    Idle,
    Running,
    /// Stopped part-way, or finished (remaining == 0).
    Paused,
}

pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Per-session countdown.
pub struct TimerEngine {
    total_secs: u64,
    remaining_secs: u64,
    running: bool,
    /// Started at least once since the last reset.
    started: bool,
    epoch: u64,
    ticker: Option<TickHandle>,
    scheduler: Box<dyn TickScheduler>,
    on_completion: Option<CompletionCallback>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("total_secs", &self.total_secs)
            .field("remaining_secs", &self.remaining_secs)
            .field("running", &self.running)
            .field("started", &self.started)
            .field("epoch", &self.epoch)
            .field("ticker", &self.ticker)
            .field("has_completion", &self.on_completion.is_some())
            .finish()
    }
}

impl TimerEngine {
    /// Create an engine with a zero-length countdown.
    pub fn new(scheduler: impl TickScheduler + 'static) -> Self {
        Self {
            total_secs: 0,
            remaining_secs: 0,
            running: false,
            started: false,
            epoch: 0,
            ticker: None,
            scheduler: Box::new(scheduler),
            on_completion: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.running {
            TimerState::Running
        } else if !self.started {
            TimerState::Idle
        } else {
            TimerState::Paused
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Epoch of the live tick registration (or of the last one).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_completion_callback(&self) -> bool {
        self.on_completion.is_some()
    }

    /// 0.0 .. 1.0 through the countdown; 1.0 for a zero-length countdown.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 1.0;
        }
        1.0 - (self.remaining_secs as f64 / self.total_secs as f64)
    }

    /// `M:SS`, or `H:MM:SS` from one hour up.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Build a timer snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            state: self.state(),
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            progress: self.progress(),
            display: self.display(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace (never stack) the completion callback.
    pub fn set_on_completion(&mut self, callback: CompletionCallback) {
        self.on_completion = Some(callback);
    }

    pub fn clear_on_completion(&mut self) {
        self.on_completion = None;
    }

    /// Stop ticking, drop the completion callback and refill the countdown.
    ///
    /// `to_secs` replaces the total; `None` keeps the previous total.
    pub fn reset(&mut self, to_secs: Option<u64>) -> Event {
        self.stop_ticking();
        self.started = false;
        self.on_completion = None;
        if let Some(secs) = to_secs {
            self.total_secs = secs;
        }
        self.remaining_secs = self.total_secs;
        debug!(total_secs = self.total_secs, "timer reset");
        Event::TimerReset {
            total_secs: self.total_secs,
            at: Utc::now(),
        }
    }

    /// No-op while running or when nothing remains.
    pub fn start(&mut self) -> Option<Event> {
        if self.running || self.remaining_secs == 0 {
            return None;
        }
        self.epoch += 1;
        self.ticker = Some(self.scheduler.schedule(self.epoch));
        self.running = true;
        self.started = true;
        Some(Event::TimerStarted {
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            at: Utc::now(),
        })
    }

    /// Idempotent; returns an event only when the timer was running.
    pub fn pause(&mut self) -> Option<Event> {
        let was_running = self.running;
        self.stop_ticking();
        was_running.then(|| Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Pause when running, start otherwise.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Count one second off. Returns `Some(Event::TimerCompleted)` when the
    /// countdown reaches zero, after firing the completion callback.
    ///
    /// Ticks from a cancelled registration are ignored.
    pub fn tick(&mut self, epoch: u64) -> Option<Event> {
        let live = self.ticker.as_ref().map(TickHandle::epoch);
        if !self.running || live != Some(epoch) {
            trace!(epoch, ?live, "ignoring stale tick");
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        self.stop_ticking();
        if let Some(callback) = self.on_completion.take() {
            callback();
        }
        Some(Event::TimerCompleted {
            total_secs: self.total_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stop_ticking(&mut self) {
        self.running = false;
        // Dropping the handle cancels the source before we return.
        self.ticker = None;
    }
}

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
