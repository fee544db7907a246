//! Practice session model and DTOs.

use praxia_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A completed practice session row from the `practice_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PracticeSession {
    pub id: DbId,
    pub user_id: DbId,
    pub questions_total: i32,
    pub questions_correct: i32,
    pub questions_wrong: i32,
    pub questions_attempted: i32,
    pub time_taken_secs: i32,
    pub operation: Option<String>,
    pub difficulty: Option<String>,
    pub points_earned: i64,
    pub session_date: Day,
    pub completed_at: Timestamp,
}

/// Client-submitted results of a finished practice session. Counts are
/// validated against each other before anything is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePracticeSession {
    pub questions_total: i32,
    pub questions_correct: i32,
    pub questions_wrong: i32,
    pub time_taken_secs: i32,
    pub operation: Option<String>,
    pub difficulty: Option<String>,
}

/// Attempted/correct sums for one user over a date range or month.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct ActivityTotals {
    pub attempted: i64,
    pub correct: i64,
}

impl ActivityTotals {
    /// Accuracy as a percentage, `None` when nothing was attempted.
    pub fn accuracy_pct(&self) -> Option<f64> {
        if self.attempted == 0 {
            None
        } else {
            Some(self.correct as f64 * 100.0 / self.attempted as f64)
        }
    }
}
