//! Paper attempt model and DTOs.

use praxia_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Attempt lifecycle states stored in `paper_attempts.status`.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

/// Full row from the `paper_attempts` table.
///
/// Carries the answer key -- NEVER serialize this to API responses directly.
/// Use [`PaperAttemptResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct PaperAttempt {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub total_questions: i32,
    /// JSON array of expected answers, one string per question.
    pub answer_key: serde_json::Value,
    /// JSON array of submitted answers (`null` = unanswered), set on submit.
    pub answers: Option<serde_json::Value>,
    pub questions_attempted: i32,
    pub questions_correct: i32,
    pub score_percent: Option<f64>,
    pub status: String,
    pub points_earned: i64,
    pub session_date: Day,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Attempt representation for API responses (no answer key).
#[derive(Debug, Clone, Serialize)]
pub struct PaperAttemptResponse {
    pub id: DbId,
    pub title: String,
    pub total_questions: i32,
    pub questions_attempted: i32,
    pub questions_correct: i32,
    pub score_percent: Option<f64>,
    pub status: String,
    pub points_earned: i64,
    pub session_date: Day,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl From<PaperAttempt> for PaperAttemptResponse {
    fn from(a: PaperAttempt) -> Self {
        Self {
            id: a.id,
            title: a.title,
            total_questions: a.total_questions,
            questions_attempted: a.questions_attempted,
            questions_correct: a.questions_correct,
            score_percent: a.score_percent,
            status: a.status,
            points_earned: a.points_earned,
            session_date: a.session_date,
            started_at: a.started_at,
            completed_at: a.completed_at,
        }
    }
}

/// DTO for starting an attempt. The answer key is captured up front so
/// grading is self-contained at submit time.
#[derive(Debug, Deserialize)]
pub struct StartPaperAttempt {
    pub title: String,
    pub total_questions: i32,
    pub answer_key: serde_json::Value,
}

/// DTO for submitting an attempt's answers.
#[derive(Debug, Deserialize)]
pub struct SubmitPaperAttempt {
    pub answers: serde_json::Value,
}

/// Grading outcome written back onto the attempt row.
#[derive(Debug, Clone)]
pub struct PaperGrade {
    pub answers: serde_json::Value,
    pub questions_attempted: i32,
    pub questions_correct: i32,
    pub score_percent: f64,
    pub points_earned: i64,
}
