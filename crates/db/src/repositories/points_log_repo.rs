//! Repository for the append-only `points_log` table.

use praxia_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::points_log::{CreatePointsEntry, PointsLogEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, points, source_type, source_id, description, extra_data, created_at";

/// Appends to and reads the points ledger. The ledger is the source of
/// truth for `users.total_points`; every insert here is paired with an
/// atomic total update in the same transaction.
pub struct PointsLogRepo;

impl PointsLogRepo {
    /// Append one ledger entry.
    pub async fn insert(
        executor: impl PgExecutor<'_>,
        entry: &CreatePointsEntry,
    ) -> Result<PointsLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO points_log (user_id, points, source_type, source_id, description, extra_data)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PointsLogEntry>(&query)
            .bind(entry.user_id)
            .bind(entry.points)
            .bind(&entry.source_type)
            .bind(entry.source_id)
            .bind(&entry.description)
            .bind(&entry.extra_data)
            .fetch_one(executor)
            .await
    }

    /// A user's ledger entries, newest first, paginated.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PointsLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM points_log \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PointsLogEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Sum of all ledger entries for a user, for reconciliation against the
    /// cached total.
    pub async fn sum_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as(
                "SELECT COALESCE(SUM(points), 0)::BIGINT FROM points_log WHERE user_id = $1",
            )
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Delete a user's whole ledger (admin progress reset only).
    pub async fn delete_by_user(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM points_log WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
