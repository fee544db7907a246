//! Points arithmetic: the effort-currency formula and flat bonus amounts.
//!
//! Pure functions and constants used by the API fast path and the reward
//! worker. Lives in `core` to maintain the zero internal dependency
//! constraint.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Points per attempted question (answered, right or wrong).
pub const POINTS_PER_ATTEMPTED: i64 = 1;

/// Points per correct answer, on top of the attempted point.
pub const POINTS_PER_CORRECT: i64 = 5;

/// Flat bonus for the first login of a calendar day.
pub const DAILY_LOGIN_BONUS: i64 = 10;

/// Cost of a grace skip, deducted as a negative ledger entry.
pub const GRACE_SKIP_COST: i64 = 2000;

/// Upper bound on questions per session, rejected before any write.
pub const MAX_QUESTIONS_PER_SESSION: i64 = 1000;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Points earned by a completed session: `attempted * 1 + correct * 5`,
/// never negative.
pub fn session_points(attempted: i64, correct: i64) -> i64 {
    let total = attempted * POINTS_PER_ATTEMPTED + correct * POINTS_PER_CORRECT;
    total.max(0)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the question counts of a submitted session.
///
/// Rules:
/// - No count may be negative.
/// - `correct + wrong` must equal `attempted`.
/// - `attempted` must not exceed `total` (assigned questions).
/// - `total` must be positive and within [`MAX_QUESTIONS_PER_SESSION`].
pub fn validate_session_counts(
    total: i64,
    correct: i64,
    wrong: i64,
    attempted: i64,
) -> Result<(), CoreError> {
    if total <= 0 {
        return Err(CoreError::Validation(
            "Session must contain at least one question".to_string(),
        ));
    }
    if total > MAX_QUESTIONS_PER_SESSION {
        return Err(CoreError::Validation(format!(
            "Session must not exceed {MAX_QUESTIONS_PER_SESSION} questions"
        )));
    }
    if correct < 0 || wrong < 0 || attempted < 0 {
        return Err(CoreError::Validation(
            "Question counts must not be negative".to_string(),
        ));
    }
    if correct + wrong != attempted {
        return Err(CoreError::Validation(format!(
            "Attempted count ({attempted}) must equal correct ({correct}) + wrong ({wrong})"
        )));
    }
    if attempted > total {
        return Err(CoreError::Validation(format!(
            "Attempted count ({attempted}) must not exceed total questions ({total})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
