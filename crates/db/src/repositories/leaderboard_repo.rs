//! Repository for the `leaderboard` cache table.

use praxia_core::types::{Day, DbId};
use sqlx::{PgExecutor, PgPool};

use crate::models::leaderboard::RankedEntry;

/// Leaderboard cache maintenance and reads. The cache is rebuilt in full
/// after reward processing and admin adjustments; readers never compute
/// ranks themselves.
pub struct LeaderboardRepo;

impl LeaderboardRepo {
    /// Rebuild the whole cache from `users.total_points`, with weekly
    /// points summed from the ledger since `week_start`. Returns the number
    /// of ranked users.
    pub async fn refresh(pool: &PgPool, week_start: Day) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM leaderboard")
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(
            "INSERT INTO leaderboard (user_id, total_points, weekly_points, rank, updated_at)
             SELECT u.id,
                    u.total_points,
                    COALESCE(w.points, 0),
                    RANK() OVER (ORDER BY u.total_points DESC, u.id ASC)::INT,
                    NOW()
             FROM users u
             LEFT JOIN (
                 SELECT user_id, SUM(points) AS points
                 FROM points_log
                 WHERE created_at >= $1
                 GROUP BY user_id
             ) w ON w.user_id = u.id
             WHERE u.is_active = TRUE",
        )
        .bind(week_start)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Top entries by rank, with usernames resolved.
    pub async fn top(pool: &PgPool, limit: i64) -> Result<Vec<RankedEntry>, sqlx::Error> {
        sqlx::query_as::<_, RankedEntry>(
            "SELECT l.rank, l.user_id, u.username, l.total_points, l.weekly_points \
             FROM leaderboard l \
             JOIN users u ON u.id = l.user_id \
             ORDER BY l.rank ASC, l.user_id ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// One user's ranked entry, `None` when they are not on the board.
    pub async fn rank_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<RankedEntry>, sqlx::Error> {
        sqlx::query_as::<_, RankedEntry>(
            "SELECT l.rank, l.user_id, u.username, l.total_points, l.weekly_points \
             FROM leaderboard l \
             JOIN users u ON u.id = l.user_id \
             WHERE l.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Remove a user's entry (admin progress reset). The next refresh
    /// re-ranks everyone else.
    pub async fn delete_by_user(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leaderboard WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
