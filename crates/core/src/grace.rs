//! Grace skip eligibility and redemption windows.
//!
//! A grace skip lets a user spend points to excuse one missed practice day.
//! Skips are rationed to one per calendar week, with weeks anchored on
//! Monday. Redemption itself never touches the streak counters; it only
//! records the spend and the window so the next eligibility check can deny
//! a second skip in the same week.

use chrono::{Datelike, Days};

use crate::points::GRACE_SKIP_COST;
use crate::types::Day;

// ---------------------------------------------------------------------------
// State and outcomes
// ---------------------------------------------------------------------------

/// Per-user grace skip bookkeeping as stored on the user row.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraceSkipState {
    /// Monday of the week in which the most recent skip was redeemed.
    pub week_start: Option<Day>,
    /// Date of the most recent redemption.
    pub last_used: Option<Day>,
}

/// Why a grace skip request was denied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraceSkipDenial {
    #[error("grace skip requires {GRACE_SKIP_COST} points, balance is {balance}")]
    InsufficientPoints { balance: i64 },
    #[error("grace skip already used this week, next eligible on {next_eligible}")]
    AlreadyUsedThisWeek { next_eligible: Day },
}

// ---------------------------------------------------------------------------
// Week arithmetic
// ---------------------------------------------------------------------------

/// Monday of the week containing `day`.
pub fn week_start_of(day: Day) -> Day {
    let back = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

fn week_end_of(week_start: Day) -> Day {
    week_start.checked_add_days(Days::new(7)).unwrap_or(week_start)
}

// ---------------------------------------------------------------------------
// Eligibility and redemption
// ---------------------------------------------------------------------------

/// Check whether a skip can be redeemed today.
///
/// Requires a point balance covering [`GRACE_SKIP_COST`] and no prior
/// redemption inside the stored week window.
pub fn check_eligibility(
    balance: i64,
    state: &GraceSkipState,
    today: Day,
) -> Result<(), GraceSkipDenial> {
    if balance < GRACE_SKIP_COST {
        return Err(GraceSkipDenial::InsufficientPoints { balance });
    }
    if let (Some(week_start), Some(last_used)) = (state.week_start, state.last_used) {
        let week_end = week_end_of(week_start);
        if today < week_end && last_used >= week_start {
            return Err(GraceSkipDenial::AlreadyUsedThisWeek {
                next_eligible: week_end,
            });
        }
    }
    Ok(())
}

/// Record a redemption on `today`, rolling the week window forward when the
/// stored one has lapsed. Eligibility must already have been checked.
pub fn redeem(state: &GraceSkipState, today: Day) -> GraceSkipState {
    let week_start = match state.week_start {
        Some(ws) if today < week_end_of(ws) => ws,
        _ => week_start_of(today),
    };
    GraceSkipState {
        week_start: Some(week_start),
        last_used: Some(today),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
