//! `run`: interactive countdown driven from stdin.
//!
//! Commands, one per line: `s` start, `p` pause/resume, `a` or an empty line
//! acknowledges a finished session, `q` quits. End of input also quits.

use clap::Args;
use focusisland_core::timer::format_clock;
use focusisland_core::{AppConfig, Event, FocusRuntime, RuntimeHandle, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::{open_settings_store, parse_goals, CliResult, SettingsOverrides};

#[derive(Args)]
pub struct RunArgs {
    /// Goal as "Title:minutes" (repeatable, in order)
    #[arg(long = "goal", short = 'g', required = true)]
    goals: Vec<String>,
    /// Apply for this run only; persisted settings are left alone
    #[command(flatten)]
    overrides: SettingsOverrides,
    /// Start the first session immediately
    #[arg(long)]
    start: bool,
}

pub fn run(args: RunArgs) -> CliResult {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_async(args))
}

async fn run_async(args: RunArgs) -> CliResult {
    let goals = parse_goals(&args.goals)?;
    let store = open_settings_store()?;
    let settings = args.overrides.resolve(&store)?;
    let config = AppConfig::load()?;

    let (focus, handle) = FocusRuntime::with_settings(goals, settings, store, config)?;
    let mut events = handle.subscribe();
    let task = tokio::spawn(focus.run());

    let snapshot = handle.snapshot().await?;
    print_loaded(snapshot.current.as_ref());
    if args.start {
        handle.start()?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if !render(&event) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !dispatch(&handle, line.trim())? {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    handle.shutdown()?;
    task.await?;
    Ok(())
}

/// Send the command for one input line. Returns `false` to quit.
fn dispatch(handle: &RuntimeHandle, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match line {
        "q" | "quit" => return Ok(false),
        "s" | "start" => handle.start()?,
        "p" | "pause" => handle.toggle()?,
        "" | "a" | "ack" => handle.acknowledge()?,
        other => eprintln!("unknown command '{other}' (s, p, a, q)"),
    }
    Ok(true)
}

/// Print one event. Returns `false` once every session is done.
fn render(event: &Event) -> bool {
    match event {
        Event::TimerStarted { remaining_secs, .. } => {
            println!("started {}", format_clock(*remaining_secs));
        }
        Event::TimerPaused { remaining_secs, .. } => {
            println!("paused {}", format_clock(*remaining_secs));
        }
        Event::TimerTicked { display, .. } => println!("{display}"),
        Event::NotificationShown { message, .. } => {
            println!("{message} (press Enter to continue)");
        }
        Event::SessionLoaded { session, .. } => {
            print_loaded(session.as_ref());
            return session.is_some();
        }
        _ => {}
    }
    true
}

fn print_loaded(session: Option<&Session>) {
    match session {
        Some(session) => println!("> {} {}", session.title, format_clock(session.length_secs)),
        None => println!("all sessions done"),
    }
}
