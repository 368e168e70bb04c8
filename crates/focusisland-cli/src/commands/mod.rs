pub mod config;
pub mod plan;
pub mod run;
pub mod settings;

use focusisland_core::storage::Database;
use focusisland_core::{parse_goal_spec, Goal, KvSettingsStore, Settings, SettingsEdit, SettingsStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Parse repeated `--goal "Title:minutes"` values in order.
pub fn parse_goals(specs: &[String]) -> Result<Vec<Goal>, Box<dyn std::error::Error>> {
    specs
        .iter()
        .map(|spec| parse_goal_spec(spec).map_err(Into::into))
        .collect()
}

pub fn open_settings_store() -> Result<KvSettingsStore, Box<dyn std::error::Error>> {
    Ok(KvSettingsStore::new(Database::open()?))
}

/// Command-line overrides on top of the persisted settings.
#[derive(clap::Args, Debug, Default)]
pub struct SettingsOverrides {
    /// Focus chunk length in minutes (5-90)
    #[arg(long)]
    pub focus: Option<u32>,
    /// Standard break length in minutes (5-60)
    #[arg(long = "break")]
    pub break_minutes: Option<u32>,
    /// Post-goal break scaling factor (0.05-0.50)
    #[arg(long)]
    pub scaling: Option<f64>,
}

impl SettingsOverrides {
    fn edits(&self) -> impl Iterator<Item = SettingsEdit> + '_ {
        self.focus
            .map(SettingsEdit::FocusMinutes)
            .into_iter()
            .chain(self.break_minutes.map(SettingsEdit::StandardBreakMinutes))
            .chain(self.scaling.map(SettingsEdit::ScalingFactor))
    }

    /// Persisted settings with each override validated and applied.
    pub fn resolve(&self, store: &impl SettingsStore) -> Result<Settings, Box<dyn std::error::Error>> {
        let mut settings = store.load();
        for edit in self.edits() {
            settings = settings.apply(edit)?;
        }
        Ok(settings)
    }
}
