//! Integration tests for the goal → session → timer pipeline.

use focusisland_core::{
    generate, Event, Goal, ManualTicks, MessagePools, SessionListState, SessionOrchestrator,
    Settings, SettingsEdit, TimerEngine,
};

fn pools() -> MessagePools {
    MessagePools {
        more_remaining: vec!["keep going".into()],
        finished: vec!["all done".into()],
    }
}

fn orchestrator(goals: &[(&str, i64)]) -> SessionOrchestrator {
    let goals = goals
        .iter()
        .map(|(t, m)| Goal::new(*t, *m).unwrap())
        .collect();
    let list = SessionListState::new(goals, Settings::default()).unwrap();
    SessionOrchestrator::new(list, TimerEngine::new(ManualTicks), pools())
}

/// Start the loaded session and tick it down to zero.
fn finish_current(o: &mut SessionOrchestrator) -> Vec<Event> {
    o.start();
    let epoch = o.timer().epoch();
    let mut events = Vec::new();
    while o.timer().is_running() {
        events.extend(o.tick(epoch));
    }
    events
}

#[test]
fn test_two_goal_scenario_lengths() {
    let goals = vec![Goal::new("A", 15).unwrap(), Goal::new("B", 10).unwrap()];
    let sessions = generate(&goals, &Settings::default()).unwrap();
    let summary: Vec<(&str, u64)> = sessions
        .iter()
        .map(|s| (s.title.as_str(), s.length_secs))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("A, Session 1", 900),
            ("Break", 780),
            ("B, Session 1", 600),
            ("Break", 720),
        ]
    );
}

#[test]
fn test_full_run_through_every_session() {
    let mut o = orchestrator(&[("A", 15), ("B", 10)]);
    let expected = [900, 780, 600, 720];

    for (i, secs) in expected.iter().enumerate() {
        assert_eq!(o.timer().total_secs(), *secs, "session {i}");
        let events = finish_current(&mut o);
        let last = i == expected.len() - 1;

        let shown = events.iter().find_map(|e| match e {
            Event::NotificationShown {
                message, finished, ..
            } => Some((message.clone(), *finished)),
            _ => None,
        });
        let (message, finished) = shown.expect("notification after each session");
        assert_eq!(finished, last);
        assert_eq!(message, if last { "all done" } else { "keep going" });
        assert_eq!(o.sessions().len(), expected.len() - i - 1);

        o.acknowledge();
    }

    assert!(o.current_session().is_none());
    assert_eq!(o.timer().total_secs(), 0);
    assert_eq!(o.timer().progress(), 1.0);
    assert!(o.start().is_empty());
}

#[test]
fn test_completion_is_not_reloaded_until_acknowledged() {
    let mut o = orchestrator(&[("A", 15)]);
    finish_current(&mut o);
    assert!(o.notification().visible);
    assert_eq!(o.timer().remaining_secs(), 0);
    assert!(o.start().is_empty());

    o.acknowledge();
    assert_eq!(o.timer().remaining_secs(), 780);
    assert!(o.acknowledge().is_empty());
}

#[test]
fn test_reorder_resets_to_first_session() {
    let mut o = orchestrator(&[("A", 15), ("B", 10)]);
    finish_current(&mut o);
    o.acknowledge();
    assert!(o.current_session().unwrap().is_break());

    let b = o.list().goals()[1].id;
    o.move_goal_up(b).unwrap();
    assert_eq!(o.list().current_index(), 0);
    let current = o.current_session().unwrap();
    assert_eq!(current.title, "B, Session 1");
    assert_eq!(o.timer().total_secs(), 600);
}

#[test]
fn test_settings_change_mid_countdown_restarts_timer() {
    let mut o = orchestrator(&[("A", 60)]);
    o.start();
    let epoch = o.timer().epoch();
    for _ in 0..30 {
        o.tick(epoch);
    }
    assert_eq!(o.timer().remaining_secs(), 1170);

    o.edit_settings(SettingsEdit::FocusMinutes(45)).unwrap();
    assert!(!o.timer().is_running());
    assert_eq!(o.timer().remaining_secs(), 45 * 60);
    assert_eq!(o.sessions().len(), 4);
    // Old ticks are dead.
    assert!(o.tick(epoch).is_empty());
}

#[test]
fn test_removing_last_goal_clears_timer() {
    let mut o = orchestrator(&[("A", 15)]);
    o.start();
    let id = o.list().goals()[0].id;
    o.remove_goal(id).unwrap();
    assert!(o.current_session().is_none());
    assert!(!o.timer().is_running());
    assert_eq!(o.timer().total_secs(), 0);
}
