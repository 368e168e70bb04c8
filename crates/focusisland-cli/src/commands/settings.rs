use clap::Subcommand;
use focusisland_core::{Settings, SettingsEdit, SettingsStore, ValidationError};

use super::{open_settings_store, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Key: focus_minutes, standard_break_minutes or scaling_factor
        key: String,
    },
    /// Set a settings value (validated against the editable range)
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings as JSON
    List,
    /// Reset settings to defaults
    Reset,
}

fn get(settings: &Settings, key: &str) -> Option<String> {
    match key {
        "focus_minutes" | "focusMinutes" => Some(settings.focus_minutes.to_string()),
        "standard_break_minutes" | "standardBreakMinutes" => {
            Some(settings.standard_break_minutes.to_string())
        }
        "scaling_factor" | "scalingFactor" => Some(format!("{:.2}", settings.scaling_factor)),
        _ => None,
    }
}

fn parse_edit(key: &str, value: &str) -> Result<SettingsEdit, ValidationError> {
    let invalid = |message: String| ValidationError::InvalidValue {
        field: key.to_string(),
        message,
    };
    let minutes = || {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(format!("'{value}' is not a whole number of minutes")))
    };
    match key {
        "focus_minutes" | "focusMinutes" => Ok(SettingsEdit::FocusMinutes(minutes()?)),
        "standard_break_minutes" | "standardBreakMinutes" => {
            Ok(SettingsEdit::StandardBreakMinutes(minutes()?))
        }
        "scaling_factor" | "scalingFactor" => value
            .trim()
            .parse::<f64>()
            .map(SettingsEdit::ScalingFactor)
            .map_err(|_| invalid(format!("'{value}' is not a number"))),
        _ => Err(invalid("unknown settings key".into())),
    }
}

pub fn run(action: SettingsAction) -> CliResult {
    let store = open_settings_store()?;
    match action {
        SettingsAction::Get { key } => match get(&store.load(), &key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        SettingsAction::Set { key, value } => {
            let next = store.load().apply(parse_edit(&key, &value)?)?;
            store.save(&next)?;
            println!("ok");
        }
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.load())?);
        }
        SettingsAction::Reset => {
            store.clear()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
