mod engine;
mod ticker;

pub use engine::{format_clock, CompletionCallback, TimerEngine, TimerState};
pub use ticker::{ManualTicks, Tick, TickHandle, TickScheduler, TokioTicks};
