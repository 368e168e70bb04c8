//! Session generation tunables.
//!
//! Persisted as a flat JSON record (see [`crate::storage::SettingsStore`]);
//! the field names match the record written by earlier releases.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::ValidationError;

/// Editable range for the focus chunk length, in minutes.
pub const FOCUS_MINUTES_RANGE: RangeInclusive<u32> = 5..=90;
/// Editable range for the standard break length, in minutes.
pub const BREAK_MINUTES_RANGE: RangeInclusive<u32> = 5..=60;
/// Editable range for the post-goal scaling factor.
pub const SCALING_FACTOR_RANGE: RangeInclusive<f64> = 0.05..=0.50;
/// Step used by the `-`/`+` scaling controls.
pub const SCALING_FACTOR_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Maximum length of a focus chunk, in minutes.
    pub focus_minutes: u32,
    /// Break between chunks of the same goal, in minutes.
    pub standard_break_minutes: u32,
    /// Post-goal break grows by `ceil(goal.minutes * scaling_factor)` minutes.
    pub scaling_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: 20,
            standard_break_minutes: 10,
            scaling_factor: 1.0 / 6.0,
        }
    }
}

/// A single field edit coming from the settings UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsEdit {
    FocusMinutes(u32),
    StandardBreakMinutes(u32),
    /// Typed-in factor; clamped into range and rounded to two decimals.
    ScalingFactor(f64),
    /// `-`/`+` button press; adds the delta, then clamps and rounds.
    AdjustScalingFactor(f64),
}

impl Settings {
    /// Check the invariants session generation relies on.
    ///
    /// These are looser than the UI edit ranges: anything stored by an older
    /// build that still generates sessions is accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.focus_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "focus_minutes".into(),
                message: "must be positive".into(),
            });
        }
        if self.standard_break_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "standard_break_minutes".into(),
                message: "must be positive".into(),
            });
        }
        if !self.scaling_factor.is_finite() || !(0.0..=1.0).contains(&self.scaling_factor) {
            return Err(ValidationError::OutOfRange {
                field: "scaling_factor",
                value: self.scaling_factor,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }

    /// Apply a UI edit, returning the new settings.
    ///
    /// # Errors
    /// Minutes outside their editable range and non-finite factors are
    /// rejected; `self` is never modified.
    pub fn apply(&self, edit: SettingsEdit) -> Result<Settings, ValidationError> {
        let mut next = *self;
        match edit {
            SettingsEdit::FocusMinutes(m) => {
                check_range("focus_minutes", m, FOCUS_MINUTES_RANGE)?;
                next.focus_minutes = m;
            }
            SettingsEdit::StandardBreakMinutes(m) => {
                check_range("standard_break_minutes", m, BREAK_MINUTES_RANGE)?;
                next.standard_break_minutes = m;
            }
            SettingsEdit::ScalingFactor(f) => {
                next.scaling_factor = clamp_scaling(f)?;
            }
            SettingsEdit::AdjustScalingFactor(delta) => {
                next.scaling_factor = clamp_scaling(self.scaling_factor + delta)?;
            }
        }
        Ok(next)
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: value as f64,
            min: *range.start() as f64,
            max: *range.end() as f64,
        })
    }
}

fn clamp_scaling(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "scaling_factor".into(),
            message: format!("{value} is not a number"),
        });
    }
    let clamped = value.clamp(*SCALING_FACTOR_RANGE.start(), *SCALING_FACTOR_RANGE.end());
    Ok((clamped * 100.0).round() / 100.0)
}
