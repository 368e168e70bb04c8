//! User-entered work goals.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;

/// Longest goal accepted, in minutes (one day).
pub const MAX_GOAL_MINUTES: u32 = 24 * 60;

/// Opaque goal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for GoalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A titled work item with an estimated duration.
///
/// Order within the goal list is significant: it determines session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    /// Estimated duration in minutes. Always positive.
    pub minutes: u32,
}

impl Goal {
    /// Build a goal from raw user input.
    ///
    /// # Errors
    /// Rejects an empty (or whitespace-only) title and non-positive minutes.
    pub fn new(title: impl Into<String>, minutes: i64) -> Result<Self, ValidationError> {
        let (title, minutes) = validate(title.into(), minutes)?;
        Ok(Self {
            id: GoalId::new(),
            title,
            minutes,
        })
    }

    /// Replace title and minutes, keeping the identity.
    ///
    /// Leaves the goal untouched when the input is rejected.
    pub fn edit(&mut self, title: impl Into<String>, minutes: i64) -> Result<(), ValidationError> {
        let (title, minutes) = validate(title.into(), minutes)?;
        self.title = title;
        self.minutes = minutes;
        Ok(())
    }
}

fn validate(title: String, minutes: i64) -> Result<(String, u32), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if minutes <= 0 {
        return Err(ValidationError::NonPositiveMinutes(minutes));
    }
    match u32::try_from(minutes) {
        Ok(m) if m <= MAX_GOAL_MINUTES => Ok((title, m)),
        _ => Err(ValidationError::OutOfRange {
            field: "minutes",
            value: minutes as f64,
            min: 1.0,
            max: f64::from(MAX_GOAL_MINUTES),
        }),
    }
}

/// Parse the CLI/UI shorthand `"Title:minutes"`.
///
/// The last `:` splits, so titles may contain colons.
pub fn parse_goal_spec(spec: &str) -> Result<Goal, ValidationError> {
    let (title, minutes) = spec
        .rsplit_once(':')
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "goal".into(),
            message: format!("expected 'Title:minutes', got '{spec}'"),
        })?;
    let minutes: i64 = minutes
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidValue {
            field: "minutes".into(),
            message: format!("'{}' is not a whole number", minutes.trim()),
        })?;
    Goal::new(title.trim(), minutes)
}
