//! One-second tick sources for [`super::TimerEngine`].
//!
//! A tick source is registered per `start()` and tagged with an epoch. Dropping
//! the returned [`TickHandle`] cancels the source; the engine also ignores any
//! tick whose epoch is not the live one, so a tick already in flight when
//! `pause()`/`reset()` ran can never mutate state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{trace, warn};

/// A single tick delivered to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
}

/// Live registration of a tick source. Cancels the source on drop.
pub struct TickHandle {
    epoch: u64,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(epoch: u64, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            epoch,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel; ticks are fed by hand.
    pub fn detached(epoch: u64) -> Self {
        Self {
            epoch,
            cancel: None,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            trace!(epoch = self.epoch, "cancelling tick source");
            cancel();
        }
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("epoch", &self.epoch)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Starts recurring one-second ticks.
pub trait TickScheduler: Send {
    fn schedule(&self, epoch: u64) -> TickHandle;
}

/// No background source: the caller invokes `tick()` itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualTicks;

impl TickScheduler for ManualTicks {
    fn schedule(&self, epoch: u64) -> TickHandle {
        TickHandle::detached(epoch)
    }
}

/// Spawns a tokio interval task per registration.
///
/// Each tick is handed to `sink`; the task ends when `sink` returns `false`
/// (receiver gone) or the handle is dropped. Missed ticks are delayed, not
/// replayed.
#[derive(Clone)]
pub struct TokioTicks {
    period: Duration,
    sink: Arc<dyn Fn(Tick) -> bool + Send + Sync>,
}

impl TokioTicks {
    pub fn new(sink: impl Fn(Tick) -> bool + Send + Sync + 'static) -> Self {
        Self::with_period(Duration::from_secs(1), sink)
    }

    pub fn with_period(
        period: Duration,
        sink: impl Fn(Tick) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            period,
            sink: Arc::new(sink),
        }
    }
}

impl TickScheduler for TokioTicks {
    fn schedule(&self, epoch: u64) -> TickHandle {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(epoch, "no tokio runtime; timer will not tick");
                return TickHandle::detached(epoch);
            }
        };

        let period = self.period;
        let sink = Arc::clone(&self.sink);
        let task = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !sink(Tick { epoch }) {
                    break;
                }
            }
        });
        TickHandle::new(epoch, move || task.abort())
    }
}
