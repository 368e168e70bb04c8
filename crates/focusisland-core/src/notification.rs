//! End-of-session notifications.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Message shown when a session ends. Stays visible until acknowledged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub visible: bool,
}

impl Notification {
    pub fn show(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            visible: true,
        }
    }
}

/// Messages to choose from, keyed by whether any session remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePools {
    #[serde(default = "default_more_remaining")]
    pub more_remaining: Vec<String>,
    #[serde(default = "default_finished")]
    pub finished: Vec<String>,
}

fn default_more_remaining() -> Vec<String> {
    [
        "Session complete. Ready for the next one?",
        "Nice work! On to the next session.",
        "Time's up. Take a breath, then keep going.",
        "One down. Let's keep the momentum.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_finished() -> Vec<String> {
    [
        "All sessions complete. Great work today!",
        "Every goal is done. Time to rest.",
        "You finished the whole list!",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for MessagePools {
    fn default() -> Self {
        Self {
            more_remaining: default_more_remaining(),
            finished: default_finished(),
        }
    }
}

impl MessagePools {
    /// Pick a message from the pool matching `more_remaining`.
    ///
    /// An empty pool falls back to the built-in one.
    pub fn pick<R: Rng + ?Sized>(&self, more_remaining: bool, rng: &mut R) -> String {
        let pool = if more_remaining {
            &self.more_remaining
        } else {
            &self.finished
        };
        if let Some(message) = pool.choose(rng) {
            return message.clone();
        }
        let fallback = if more_remaining {
            default_more_remaining()
        } else {
            default_finished()
        };
        fallback.choose(rng).cloned().unwrap_or_default()
    }
}
