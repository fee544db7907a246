//! Repository for the `paper_attempts` table.

use praxia_core::types::{Day, DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::paper_attempt::{PaperAttempt, PaperGrade, StartPaperAttempt};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, total_questions, answer_key, answers, \
                        questions_attempted, questions_correct, score_percent, status, \
                        points_earned, session_date, started_at, completed_at";

/// Provides persistence for paper attempts and the stale-attempt sweep.
pub struct PaperAttemptRepo;

impl PaperAttemptRepo {
    /// Start an attempt in `in_progress` state, capturing the answer key.
    pub async fn start(
        pool: &PgPool,
        user_id: DbId,
        input: &StartPaperAttempt,
    ) -> Result<PaperAttempt, sqlx::Error> {
        let query = format!(
            "INSERT INTO paper_attempts (user_id, title, total_questions, answer_key)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaperAttempt>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(input.total_questions)
            .bind(&input.answer_key)
            .fetch_one(pool)
            .await
    }

    /// Find an attempt by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PaperAttempt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM paper_attempts WHERE id = $1");
        sqlx::query_as::<_, PaperAttempt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an attempt by ID with a row lock. Submission grades and
    /// completes under this lock so concurrent submits serialize.
    pub async fn find_by_id_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<PaperAttempt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM paper_attempts WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, PaperAttempt>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Complete an in-progress attempt with its grade. Returns `None` when
    /// the attempt was already completed (lost race or duplicate submit).
    pub async fn complete(
        executor: impl PgExecutor<'_>,
        id: DbId,
        grade: &PaperGrade,
    ) -> Result<Option<PaperAttempt>, sqlx::Error> {
        let query = format!(
            "UPDATE paper_attempts SET
                answers = $2,
                questions_attempted = $3,
                questions_correct = $4,
                score_percent = $5,
                points_earned = $6,
                status = 'completed',
                completed_at = NOW()
             WHERE id = $1 AND status = 'in_progress'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaperAttempt>(&query)
            .bind(id)
            .bind(&grade.answers)
            .bind(grade.questions_attempted)
            .bind(grade.questions_correct)
            .bind(grade.score_percent)
            .bind(grade.points_earned)
            .fetch_optional(executor)
            .await
    }

    /// A user's attempts, newest first, paginated. Answer keys stay inside
    /// the db layer; callers convert to response DTOs.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PaperAttempt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM paper_attempts \
             WHERE user_id = $1 \
             ORDER BY started_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PaperAttempt>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total questions attempted in a user's completed attempts on one day.
    /// Drives streak qualification for Vedic Maths students.
    pub async fn attempted_on_day(
        pool: &PgPool,
        user_id: DbId,
        day: Day,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(questions_attempted), 0) FROM paper_attempts \
             WHERE user_id = $1 AND session_date = $2 AND status = 'completed'",
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Days in `[start, end)` whose summed attempted count across completed
    /// attempts reaches `min_attempted`. Used for the full-month streak
    /// coverage check.
    pub async fn qualifying_days_between(
        pool: &PgPool,
        user_id: DbId,
        start: Day,
        end: Day,
        min_attempted: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM ( \
                 SELECT session_date FROM paper_attempts \
                 WHERE user_id = $1 AND session_date >= $2 AND session_date < $3 \
                   AND status = 'completed' \
                 GROUP BY session_date \
                 HAVING SUM(questions_attempted) >= $4 \
             ) qualifying",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .bind(min_attempted)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Force-complete every attempt left in progress since before `cutoff`,
    /// scoring it zero. Returns the number of attempts swept.
    pub async fn expire_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE paper_attempts SET
                status = 'completed',
                score_percent = 0,
                questions_attempted = 0,
                questions_correct = 0,
                completed_at = NOW()
             WHERE status = 'in_progress' AND started_at < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Per-user variant of [`Self::expire_stale`], run by the read path so a
    /// listing never shows an hour-old attempt as live.
    pub async fn expire_stale_for_user(
        pool: &PgPool,
        user_id: DbId,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE paper_attempts SET
                status = 'completed',
                score_percent = 0,
                questions_attempted = 0,
                questions_correct = 0,
                completed_at = NOW()
             WHERE user_id = $1 AND status = 'in_progress' AND started_at < $2",
        )
        .bind(user_id)
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete all of a user's attempts (admin progress reset).
    pub async fn delete_by_user(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM paper_attempts WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
