//! Repository for the `users` table.
//!
//! Besides auth CRUD, this owns the per-user gamification aggregate
//! (total_points, streak columns, grace-skip window). Aggregate writes that
//! must land in the same transaction as a ledger entry take any
//! `PgExecutor` instead of a pool.

use praxia_core::grace::GraceSkipState;
use praxia_core::streak::StreakState;
use praxia_core::types::{Day, DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role, is_active, \
                        failed_login_count, locked_until, last_login_at, \
                        total_points, current_streak, longest_streak, \
                        total_questions_attempted, last_practice_date, \
                        last_grace_skip_date, grace_skip_week_start, \
                        last_daily_login_bonus_date, created_at, updated_at";

/// Provides CRUD and aggregate operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by ID with a row lock, for transactional read-then-write
    /// sequences (grace skip redemption, admin adjustments).
    pub async fn find_by_id_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Top users by total points, for the leaderboard badge evaluation.
    pub async fn top_by_points(pool: &PgPool, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE is_active = TRUE \
             ORDER BY total_points DESC, id ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Login bookkeeping
    // -----------------------------------------------------------------------

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear
    /// `locked_until`, and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Claim today's login bonus. Returns `true` exactly once per user per
    /// calendar day; the caller awards the points in the same transaction.
    pub async fn claim_daily_login_bonus(
        executor: impl PgExecutor<'_>,
        id: DbId,
        today: Day,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET last_daily_login_bonus_date = $2 \
             WHERE id = $1 \
               AND (last_daily_login_bonus_date IS NULL OR last_daily_login_bonus_date < $2)",
        )
        .bind(id)
        .bind(today)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Gamification aggregate
    // -----------------------------------------------------------------------

    /// Apply a point delta atomically, returning the new total. Pair every
    /// call with a ledger insert in the same transaction.
    pub async fn add_points(
        executor: impl PgExecutor<'_>,
        id: DbId,
        delta: i64,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "UPDATE users SET total_points = total_points + $2 \
             WHERE id = $1 \
             RETURNING total_points",
        )
        .bind(id)
        .bind(delta)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Overwrite the cached total (admin adjustment), returning the new
    /// value. Returns `None` if no row with the given `id` exists.
    pub async fn set_total_points(
        executor: impl PgExecutor<'_>,
        id: DbId,
        total: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE users SET total_points = $2 WHERE id = $1 RETURNING total_points",
        )
        .bind(id)
        .bind(total)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Bump the lifetime question counter by the attempted count of one
    /// session.
    pub async fn increment_questions_attempted(
        executor: impl PgExecutor<'_>,
        id: DbId,
        by: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET total_questions_attempted = total_questions_attempted + $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(by)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Persist the streak columns produced by a streak transition.
    pub async fn update_streak(
        executor: impl PgExecutor<'_>,
        id: DbId,
        state: &StreakState,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                current_streak = $2,
                longest_streak = $3,
                last_practice_date = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(state.current)
        .bind(state.longest)
        .bind(state.last_practice_date)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Persist the grace-skip window after a redemption.
    pub async fn record_grace_skip(
        executor: impl PgExecutor<'_>,
        id: DbId,
        state: &GraceSkipState,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                grace_skip_week_start = $2,
                last_grace_skip_date = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(state.week_start)
        .bind(state.last_used)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Zero out the gamification aggregate (admin progress reset). Activity
    /// and ledger rows are deleted separately by their own repositories.
    pub async fn reset_progress(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                total_points = 0,
                current_streak = 0,
                longest_streak = 0,
                total_questions_attempted = 0,
                last_practice_date = NULL,
                last_grace_skip_date = NULL,
                grace_skip_week_start = NULL,
                last_daily_login_bonus_date = NULL
             WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
