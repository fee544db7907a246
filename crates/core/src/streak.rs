//! Daily practice streak state machine.
//!
//! One transition is evaluated per completed activity event. The caller
//! supplies the cumulative attempted-question counts for today (including
//! the event being processed) and for yesterday, recomputed from stored
//! sessions rather than cached. The transition itself is pure; the reward
//! worker persists the returned state.
//!
//! Grace skips never enter the transition. Redeeming one is an explicit
//! user action handled by [`crate::grace`]; it preserves the stored streak
//! by making the missed day's reset never happen.

use crate::types::Day;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum attempted questions (correct + wrong) for a day to count toward
/// the streak.
pub const QUALIFYING_ATTEMPTED_MIN: i64 = 15;

/// Flat point bonuses for reaching a streak milestone, awarded once when the
/// streak increments to exactly this length.
const MILESTONE_BONUSES: &[(i32, i64)] = &[(7, 50), (14, 100), (21, 200)];

/// Minimum streak length for the full-calendar-month bonus check.
pub const FULL_MONTH_MIN_STREAK: i32 = 28;

/// Bonus awarded with the Monthly Streak Champion badge.
pub const FULL_MONTH_BONUS: i64 = 500;

// ---------------------------------------------------------------------------
// State and inputs
// ---------------------------------------------------------------------------

/// Per-user streak state as stored on the user row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StreakState {
    /// Consecutive qualifying days, never negative.
    pub current: i32,
    /// High-water mark of `current`. Invariant: `current <= longest`.
    pub longest: i32,
    /// Date of the most recent activity check, qualifying or not.
    pub last_practice_date: Option<Day>,
}

/// Inputs to one streak transition.
#[derive(Debug, Clone)]
pub struct DayActivity {
    /// Current calendar day.
    pub today: Day,
    /// Cumulative attempted questions across all of today's sessions,
    /// including the one being processed.
    pub attempted_today: i64,
    /// Attempted questions on the day before `today`, recomputed from that
    /// day's stored sessions. Only consulted when the stored practice date
    /// is exactly yesterday.
    pub attempted_yesterday: i64,
}

/// What the transition did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Same qualifying day; nothing to update.
    Unchanged,
    /// A later same-day event pulled today's cumulative count back under
    /// the threshold, so the streak collapsed to 0.
    Diluted,
    /// A new streak began at 1.
    Started,
    /// A consecutive qualifying day extended the streak by 1.
    Incremented,
    /// Today does not qualify and no streak survives; now 0.
    Reset,
}

/// Result of applying one activity event to a [`StreakState`].
#[derive(Debug, Clone)]
pub struct StreakOutcome {
    pub state: StreakState,
    pub change: StreakChange,
    /// The post-transition safety re-check fired: the streak was positive
    /// while today did not qualify, and was forced back to 0. Callers log
    /// this at warn level.
    pub forced_reset: bool,
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Whether a day's cumulative attempted count meets the streak threshold.
pub fn day_qualifies(attempted: i64) -> bool {
    attempted >= QUALIFYING_ATTEMPTED_MIN
}

/// Apply one completed activity event to the streak state.
///
/// The transition depends on the whole-day difference between `today` and
/// the stored practice date:
///
/// - same day: a qualifying day stays as it was; a day whose cumulative
///   count fell back under the threshold resets to 0. Increments only ever
///   happen on a new day.
/// - exactly one day later: if yesterday independently qualified, the streak
///   increments; otherwise it restarts at 1 (today qualifying) or 0.
/// - two or more days later, or no prior date: restart at 1 or 0.
///
/// `last_practice_date` is set to `today` on every call regardless of
/// outcome, and `longest` is raised to cover the new `current` before the
/// safety re-check so the `current <= longest` invariant always holds.
pub fn apply_activity(prior: &StreakState, activity: &DayActivity) -> StreakOutcome {
    let qualifies_today = day_qualifies(activity.attempted_today);

    let (mut current, change) = match prior.last_practice_date {
        Some(last) => {
            let days_diff = (activity.today - last).num_days();
            if days_diff == 0 {
                if qualifies_today {
                    (prior.current, StreakChange::Unchanged)
                } else {
                    (0, StreakChange::Diluted)
                }
            } else if days_diff == 1 {
                if day_qualifies(activity.attempted_yesterday) {
                    (prior.current + 1, StreakChange::Incremented)
                } else if qualifies_today {
                    (1, StreakChange::Started)
                } else {
                    (0, StreakChange::Reset)
                }
            } else if qualifies_today {
                (1, StreakChange::Started)
            } else {
                (0, StreakChange::Reset)
            }
        }
        None => {
            if qualifies_today {
                (1, StreakChange::Started)
            } else {
                (0, StreakChange::Reset)
            }
        }
    };

    let longest = prior.longest.max(current);

    // A positive streak must never stand on a non-qualifying day. The
    // increment branch can produce one when yesterday qualified but today
    // has not (yet); collapse it and let the caller log the correction.
    let forced_reset = current > 0 && !qualifies_today;
    if forced_reset {
        current = 0;
    }

    StreakOutcome {
        state: StreakState {
            current,
            longest,
            last_practice_date: Some(activity.today),
        },
        change,
        forced_reset,
    }
}

// ---------------------------------------------------------------------------
// Milestone bonuses
// ---------------------------------------------------------------------------

/// Flat bonus for a streak that just incremented to exactly `streak` days.
///
/// Returns `None` for non-milestone lengths. Only call on an
/// [`StreakChange::Incremented`] transition; the equality check is what
/// keeps the bonus one-time per run (the streak passes each length once).
pub fn milestone_bonus(streak: i32) -> Option<i64> {
    MILESTONE_BONUSES
        .iter()
        .find(|(days, _)| *days == streak)
        .map(|(_, bonus)| *bonus)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(current: i32, longest: i32, last: Option<Day>) -> StreakState {
        StreakState {
            current,
            longest,
            last_practice_date: last,
        }
    }

    // -- first activity -----------------------------------------------------

    #[test]
    fn first_practice_qualifying_starts_at_one() {
        let today = day(2026, 5, 10);
        let out = apply_activity(
            &state(0, 0, None),
            &DayActivity {
                today,
                attempted_today: 15,
                attempted_yesterday: 0,
            },
        );
        assert_eq!(out.state.current, 1);
        assert_eq!(out.state.longest, 1);
        assert_eq!(out.change, StreakChange::Started);
        assert_eq!(out.state.last_practice_date, Some(today));
        assert!(!out.forced_reset);
    }

    #[test]
    fn first_practice_under_threshold_stays_zero() {
        let out = apply_activity(
            &state(0, 0, None),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 14,
                attempted_yesterday: 0,
            },
        );
        assert_eq!(out.state.current, 0);
        assert_eq!(out.change, StreakChange::Reset);
    }

    // -- same day -------------------------------------------------------------

    #[test]
    fn same_day_still_qualifying_is_unchanged() {
        let today = day(2026, 5, 10);
        let out = apply_activity(
            &state(5, 8, Some(today)),
            &DayActivity {
                today,
                attempted_today: 22,
                attempted_yesterday: 0,
            },
        );
        assert_eq!(out.state.current, 5);
        assert_eq!(out.state.longest, 8);
        assert_eq!(out.change, StreakChange::Unchanged);
    }

    #[test]
    fn same_day_dilution_resets_to_zero() {
        // A qualifying day re-evaluated after another event that leaves the
        // cumulative count under the threshold collapses the streak.
        let today = day(2026, 5, 10);
        let out = apply_activity(
            &state(5, 8, Some(today)),
            &DayActivity {
                today,
                attempted_today: 9,
                attempted_yesterday: 0,
            },
        );
        assert_eq!(out.state.current, 0);
        assert_eq!(out.change, StreakChange::Diluted);
    }

    #[test]
    fn same_day_transition_is_idempotent() {
        let today = day(2026, 5, 10);
        let activity = DayActivity {
            today,
            attempted_today: 20,
            attempted_yesterday: 0,
        };
        let first = apply_activity(&state(3, 3, Some(today)), &activity);
        let second = apply_activity(&first.state, &activity);
        assert_eq!(first.state.current, 3);
        assert_eq!(second.state.current, 3);
        assert_eq!(second.change, StreakChange::Unchanged);
    }

    // -- consecutive day ------------------------------------------------------

    #[test]
    fn consecutive_qualifying_day_increments() {
        let out = apply_activity(
            &state(5, 5, Some(day(2026, 5, 9))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 16,
                attempted_yesterday: 20,
            },
        );
        assert_eq!(out.state.current, 6);
        assert_eq!(out.state.longest, 6);
        assert_eq!(out.change, StreakChange::Incremented);
    }

    #[test]
    fn increment_does_not_lower_longest() {
        let out = apply_activity(
            &state(3, 10, Some(day(2026, 5, 9))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 18,
                attempted_yesterday: 17,
            },
        );
        assert_eq!(out.state.current, 4);
        assert_eq!(out.state.longest, 10);
    }

    #[test]
    fn consecutive_day_yesterday_unqualified_restarts() {
        let out = apply_activity(
            &state(5, 5, Some(day(2026, 5, 9))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 16,
                attempted_yesterday: 10,
            },
        );
        assert_eq!(out.state.current, 1);
        assert_eq!(out.change, StreakChange::Started);
    }

    #[test]
    fn consecutive_day_nothing_qualifies_resets() {
        let out = apply_activity(
            &state(5, 5, Some(day(2026, 5, 9))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 3,
                attempted_yesterday: 10,
            },
        );
        assert_eq!(out.state.current, 0);
        assert_eq!(out.change, StreakChange::Reset);
    }

    #[test]
    fn increment_on_unqualified_today_is_force_reset() {
        // Yesterday qualified so the table says increment, but today's count
        // is still under the threshold; the safety re-check collapses it.
        let out = apply_activity(
            &state(5, 5, Some(day(2026, 5, 9))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 4,
                attempted_yesterday: 20,
            },
        );
        assert_eq!(out.state.current, 0);
        assert!(out.forced_reset);
        // The increment still registered on the high-water mark.
        assert_eq!(out.state.longest, 6);
    }

    // -- gaps -------------------------------------------------------------

    #[test]
    fn gap_of_three_days_restarts_at_one() {
        let out = apply_activity(
            &state(12, 12, Some(day(2026, 5, 7))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 16,
                attempted_yesterday: 25,
            },
        );
        // Yesterday's count is irrelevant across a gap.
        assert_eq!(out.state.current, 1);
        assert_eq!(out.change, StreakChange::Started);
        assert_eq!(out.state.longest, 12);
    }

    #[test]
    fn gap_without_qualifying_today_resets_to_zero() {
        let out = apply_activity(
            &state(12, 12, Some(day(2026, 5, 7))),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 5,
                attempted_yesterday: 0,
            },
        );
        assert_eq!(out.state.current, 0);
        assert_eq!(out.change, StreakChange::Reset);
    }

    // -- invariants -----------------------------------------------------------

    #[test]
    fn last_practice_date_updates_on_every_outcome() {
        let today = day(2026, 5, 10);
        let out = apply_activity(
            &state(2, 2, Some(day(2026, 5, 1))),
            &DayActivity {
                today,
                attempted_today: 0,
                attempted_yesterday: 0,
            },
        );
        assert_eq!(out.state.current, 0);
        assert_eq!(out.state.last_practice_date, Some(today));
    }

    #[test]
    fn current_never_exceeds_longest() {
        let out = apply_activity(
            &state(0, 0, None),
            &DayActivity {
                today: day(2026, 5, 10),
                attempted_today: 30,
                attempted_yesterday: 0,
            },
        );
        assert!(out.state.current <= out.state.longest);
    }

    // -- milestone bonuses ------------------------------------------------

    #[test]
    fn milestone_bonuses_at_exact_lengths() {
        assert_eq!(milestone_bonus(7), Some(50));
        assert_eq!(milestone_bonus(14), Some(100));
        assert_eq!(milestone_bonus(21), Some(200));
    }

    #[test]
    fn no_bonus_between_milestones() {
        assert_eq!(milestone_bonus(6), None);
        assert_eq!(milestone_bonus(8), None);
        assert_eq!(milestone_bonus(22), None);
        assert_eq!(milestone_bonus(28), None);
    }
}
