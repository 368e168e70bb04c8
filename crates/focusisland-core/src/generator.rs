//! Goals + settings → ordered session list.
//!
//! For each goal, in order:
//!
//! ```text
//! [focus chunk, break, focus chunk, break, ..., focus chunk] post-goal break
//! ```
//!
//! Chunks are `min(remaining, focus_minutes)` long, so the chunk lengths of a
//! goal always sum to its minutes. The post-goal break is
//! `standard_break_minutes + ceil(goal.minutes * scaling_factor)`.

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::goal::Goal;
use crate::session::Session;
use crate::settings::Settings;

/// Build the session list for `goals`.
///
/// # Errors
/// Returns [`CoreError::InvalidConfiguration`] when `focus_minutes` is zero,
/// since no chunk could ever make progress.
pub fn generate(goals: &[Goal], settings: &Settings) -> Result<Vec<Session>> {
    if settings.focus_minutes == 0 {
        return Err(CoreError::InvalidConfiguration(
            "focus_minutes must be positive".into(),
        ));
    }

    let mut sessions = Vec::new();
    for goal in goals {
        let mut remaining = goal.minutes;
        let mut chunk_index = 1;
        while remaining > 0 {
            let chunk = remaining.min(settings.focus_minutes);
            sessions.push(Session::focus(&goal.title, chunk_index, chunk));
            remaining -= chunk;
            chunk_index += 1;

            if remaining > 0 {
                sessions.push(Session::rest(settings.standard_break_minutes));
            }
        }

        sessions.push(Session::rest(post_goal_break_minutes(goal, settings)));
    }

    debug!(goals = goals.len(), sessions = sessions.len(), "generated sessions");
    Ok(sessions)
}

/// Length of the break appended after all of a goal's chunks, in minutes.
pub fn post_goal_break_minutes(goal: &Goal, settings: &Settings) -> u32 {
    let extra = (f64::from(goal.minutes) * settings.scaling_factor).ceil();
    // Validated settings keep the factor in [0, 1], so `extra <= goal.minutes`.
    let extra = if extra.is_finite() && extra > 0.0 {
        extra as u32
    } else {
        0
    };
    settings.standard_break_minutes.saturating_add(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;
    use proptest::prelude::*;

    fn goal(title: &str, minutes: i64) -> Goal {
        Goal::new(title, minutes).unwrap()
    }

    fn lengths(sessions: &[Session]) -> Vec<u64> {
        sessions.iter().map(|s| s.length_secs).collect()
    }

    #[test]
    fn empty_goals_give_empty_list() {
        assert!(generate(&[], &Settings::default()).unwrap().is_empty());
    }

    #[test]
    fn zero_focus_minutes_is_invalid_configuration() {
        let settings = Settings {
            focus_minutes: 0,
            ..Settings::default()
        };
        let err = generate(&[goal("A", 10)], &settings).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn sixty_minute_goal_with_defaults() {
        let sessions = generate(&[goal("Deep work", 60)], &Settings::default()).unwrap();
        assert_eq!(sessions.len(), 6);
        assert_eq!(
            lengths(&sessions),
            vec![1200, 600, 1200, 600, 1200, 1200]
        );
        let titles: Vec<&str> = sessions.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Deep work, Session 1",
                "Break",
                "Deep work, Session 2",
                "Break",
                "Deep work, Session 3",
                "Break",
            ]
        );
    }

    #[test]
    fn two_short_goals_each_get_post_break() {
        let sessions = generate(&[goal("A", 15), goal("B", 10)], &Settings::default()).unwrap();
        // A: 10 + ceil(2.5) = 13 min; B: 10 + ceil(1.67) = 12 min.
        assert_eq!(lengths(&sessions), vec![900, 780, 600, 720]);
        assert_eq!(sessions[0].title, "A, Session 1");
        assert_eq!(sessions[2].title, "B, Session 1");
        assert!(sessions[1].is_break() && sessions[3].is_break());
    }

    #[test]
    fn uneven_goal_has_short_last_chunk() {
        let sessions = generate(&[goal("Essay", 45)], &Settings::default()).unwrap();
        let focus: Vec<u64> = sessions
            .iter()
            .filter(|s| s.kind == SessionKind::Focus)
            .map(|s| s.length_min())
            .collect();
        assert_eq!(focus, vec![20, 20, 5]);
    }

    #[test]
    fn zero_scaling_gives_standard_post_break() {
        let settings = Settings {
            scaling_factor: 0.0,
            ..Settings::default()
        };
        let sessions = generate(&[goal("A", 20)], &settings).unwrap();
        assert_eq!(lengths(&sessions), vec![1200, 600]);
    }

    #[test]
    fn fresh_ids_on_every_call() {
        let goals = [goal("A", 20)];
        let first = generate(&goals, &Settings::default()).unwrap();
        let second = generate(&goals, &Settings::default()).unwrap();
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(first[0].title, second[0].title);
    }

    proptest! {
        #[test]
        fn focus_chunks_sum_to_goal_minutes(minutes in 1i64..600, focus in 1u32..120) {
            let settings = Settings { focus_minutes: focus, ..Settings::default() };
            let sessions = generate(&[goal("G", minutes)], &settings).unwrap();
            let focus_secs: u64 = sessions
                .iter()
                .filter(|s| s.kind == SessionKind::Focus)
                .map(|s| s.length_secs)
                .sum();
            prop_assert_eq!(focus_secs, minutes as u64 * 60);
            prop_assert!(sessions
                .iter()
                .filter(|s| s.kind == SessionKind::Focus)
                .all(|s| s.length_secs <= u64::from(focus) * 60));
        }

        #[test]
        fn exact_multiples_produce_two_k_sessions(k in 1u32..20, focus in 1u32..72) {
            let settings = Settings { focus_minutes: focus, ..Settings::default() };
            let sessions = generate(&[goal("G", i64::from(k * focus))], &settings).unwrap();
            prop_assert_eq!(sessions.len(), 2 * k as usize);
            let breaks = sessions.iter().filter(|s| s.is_break()).count();
            prop_assert_eq!(breaks, k as usize);
            prop_assert!(sessions.last().unwrap().is_break());
        }

        #[test]
        fn post_break_follows_formula(
            minutes in 1i64..600,
            brk in 1u32..60,
            scaling in 0.0f64..=1.0,
        ) {
            let settings = Settings {
                standard_break_minutes: brk,
                scaling_factor: scaling,
                ..Settings::default()
            };
            let g = goal("G", minutes);
            let sessions = generate(std::slice::from_ref(&g), &settings).unwrap();
            let expected = u64::from(brk) + (minutes as f64 * scaling).ceil() as u64;
            prop_assert_eq!(sessions.last().unwrap().length_secs, expected * 60);
        }
    }
}
