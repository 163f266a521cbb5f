use chrono::{DateTime, Duration, Utc};

use crate::session::Session;

/// Decide whether a session must be cleared before handling a new prompt.
///
/// Two independent triggers, either of which forces a reset:
/// - turn-count overflow: `max_turns` is configured and the session has
///   reached it (the boundary itself counts);
/// - staleness: the previous prompt is more than `reset_delta` in the past.
///
/// A session that has never seen a prompt (`last_activity == None`) never
/// time-resets, even with a zero delta.
pub fn should_reset(
    session: &Session,
    max_turns: Option<u32>,
    reset_delta: Duration,
    now: DateTime<Utc>,
) -> bool {
    if let Some(max) = max_turns {
        if session.turn_count() >= max {
            return true;
        }
    }

    match session.last_activity() {
        Some(last) => now - last > reset_delta,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_never_resets_even_with_zero_delta() {
        let session = Session::new("s");
        assert!(!should_reset(
            &session,
            Some(10),
            Duration::zero(),
            Utc::now()
        ));
    }

    #[test]
    fn turn_count_boundary_triggers_reset() {
        let mut session = Session::new("s");
        let now = Utc::now();
        session.note_prompt(now);
        session.note_prompt(now);
        assert!(!should_reset(&session, Some(3), Duration::hours(1), now));
        session.note_prompt(now);
        assert!(should_reset(&session, Some(3), Duration::hours(1), now));
    }

    #[test]
    fn unset_max_turns_disables_the_turn_trigger() {
        let mut session = Session::new("s");
        let now = Utc::now();
        for _ in 0..100 {
            session.note_prompt(now);
        }
        assert!(!should_reset(&session, None, Duration::hours(1), now));
    }

    #[test]
    fn idle_time_past_delta_triggers_reset() {
        let mut session = Session::new("s");
        let now = Utc::now();
        session.note_prompt(now - Duration::minutes(61));
        assert!(should_reset(&session, None, Duration::minutes(60), now));
    }

    #[test]
    fn idle_time_at_exactly_delta_does_not_reset() {
        let mut session = Session::new("s");
        let now = Utc::now();
        session.note_prompt(now - Duration::minutes(60));
        assert!(!should_reset(&session, None, Duration::minutes(60), now));
    }

    #[test]
    fn either_trigger_alone_is_sufficient() {
        let mut session = Session::new("s");
        let now = Utc::now();
        session.note_prompt(now - Duration::hours(2));
        // Idle fires, turn count does not.
        assert!(should_reset(&session, Some(50), Duration::hours(1), now));
        // Turn count fires, idle does not.
        let mut fresh = Session::new("s");
        fresh.note_prompt(now);
        assert!(should_reset(&fresh, Some(1), Duration::hours(1), now));
    }
}
