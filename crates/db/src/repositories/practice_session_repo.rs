//! Repository for the `practice_sessions` table.

use praxia_core::types::{Day, DbId};
use sqlx::{PgExecutor, PgPool};

use crate::models::practice_session::{ActivityTotals, CreatePracticeSession, PracticeSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, questions_total, questions_correct, questions_wrong, \
                        questions_attempted, time_taken_secs, operation, difficulty, \
                        points_earned, session_date, completed_at";

/// Provides persistence and day/month aggregates for practice sessions.
pub struct PracticeSessionRepo;

impl PracticeSessionRepo {
    /// Insert a completed session. Runs inside the fast-path transaction,
    /// so this takes any executor. `questions_attempted` is derived in SQL
    /// from correct + wrong.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
        input: &CreatePracticeSession,
        points_earned: i64,
        session_date: Day,
    ) -> Result<PracticeSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO practice_sessions \
                (user_id, questions_total, questions_correct, questions_wrong, \
                 questions_attempted, time_taken_secs, operation, difficulty, \
                 points_earned, session_date)
             VALUES ($1, $2, $3, $4, $3 + $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PracticeSession>(&query)
            .bind(user_id)
            .bind(input.questions_total)
            .bind(input.questions_correct)
            .bind(input.questions_wrong)
            .bind(input.time_taken_secs)
            .bind(&input.operation)
            .bind(&input.difficulty)
            .bind(points_earned)
            .bind(session_date)
            .fetch_one(executor)
            .await
    }

    /// Find a session by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PracticeSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM practice_sessions WHERE id = $1");
        sqlx::query_as::<_, PracticeSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's sessions, newest first, paginated.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PracticeSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM practice_sessions \
             WHERE user_id = $1 \
             ORDER BY completed_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PracticeSession>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total questions attempted by a user on one day, across all of that
    /// day's sessions. Drives streak qualification.
    pub async fn attempted_on_day(
        pool: &PgPool,
        user_id: DbId,
        day: Day,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(questions_attempted), 0) FROM practice_sessions \
             WHERE user_id = $1 AND session_date = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Attempted/correct sums for a user over `[start, end)`.
    pub async fn totals_between(
        pool: &PgPool,
        user_id: DbId,
        start: Day,
        end: Day,
    ) -> Result<ActivityTotals, sqlx::Error> {
        sqlx::query_as::<_, ActivityTotals>(
            "SELECT COALESCE(SUM(questions_attempted), 0) AS attempted, \
                    COALESCE(SUM(questions_correct), 0) AS correct \
             FROM practice_sessions \
             WHERE user_id = $1 AND session_date >= $2 AND session_date < $3",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }

    /// Days in `[start, end)` whose summed attempted count reaches
    /// `min_attempted`. Used for the full-month streak coverage check.
    pub async fn qualifying_days_between(
        pool: &PgPool,
        user_id: DbId,
        start: Day,
        end: Day,
        min_attempted: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM ( \
                 SELECT session_date FROM practice_sessions \
                 WHERE user_id = $1 AND session_date >= $2 AND session_date < $3 \
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

    /// Users with any session in `[start, end)`. Drives the monthly
    /// accuracy badge pass.
    pub async fn users_active_between(
        pool: &PgPool,
        start: Day,
        end: Day,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT user_id FROM practice_sessions \
             WHERE session_date >= $1 AND session_date < $2 \
             ORDER BY user_id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Delete all of a user's sessions (admin progress reset).
    pub async fn delete_by_user(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM practice_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
