//! `plan`: print generated sessions without running them.

use clap::Args;
use focusisland_core::generate;
use focusisland_core::timer::format_clock;

use super::{open_settings_store, parse_goals, CliResult, SettingsOverrides};

#[derive(Args)]
pub struct PlanArgs {
    /// Goal as "Title:minutes" (repeatable, in order)
    #[arg(long = "goal", short = 'g', required = true)]
    goals: Vec<String>,
    #[command(flatten)]
    overrides: SettingsOverrides,
    /// Output sessions as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> CliResult {
    let goals = parse_goals(&args.goals)?;
    let store = open_settings_store()?;
    let settings = args.overrides.resolve(&store)?;
    let sessions = generate(&goals, &settings)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    for (i, session) in sessions.iter().enumerate() {
        println!(
            "{:>2}. {:<8} {:>7}  {}",
            i + 1,
            if session.is_break() { "break" } else { "focus" },
            format_clock(session.length_secs),
            session.title
        );
    }
    let total: u64 = sessions.iter().map(|s| s.length_secs).sum();
    println!("total {}", format_clock(total));
    Ok(())
}
