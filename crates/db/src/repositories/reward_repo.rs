//! Repository for the `rewards` (earned badges) table.

use praxia_core::badges::{BadgeSpec, LEGACY_BADGE_TYPES};
use praxia_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::reward::Reward;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, badge_type, badge_name, badge_category, \
                        is_lifetime, month_earned, earned_at";

fn legacy_types() -> Vec<String> {
    LEGACY_BADGE_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Awarding and reading badges. All award paths are idempotent; the partial
/// unique indexes absorb replays as no-ops.
pub struct RewardRepo;

impl RewardRepo {
    /// Award a badge from the catalog if not already held. `month` is
    /// `None` for lifetime/SUPER badges and `Some("YYYY-MM")` for monthly
    /// ones. Returns `true` only when the row was newly inserted, which is
    /// what gates one-time bonuses tied to an award.
    pub async fn try_award(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
        badge: &BadgeSpec,
        month: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let is_lifetime = badge.category == praxia_core::badges::category::LIFETIME;
        let result = sqlx::query(
            "INSERT INTO rewards (user_id, badge_type, badge_name, badge_category, is_lifetime, month_earned)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(badge.badge_type)
        .bind(badge.name)
        .bind(badge.category)
        .bind(is_lifetime)
        .bind(month)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A user's badges, newest first. Legacy badge types are filtered out.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Reward>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rewards \
             WHERE user_id = $1 AND badge_type <> ALL($2) \
             ORDER BY earned_at DESC, id DESC"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(user_id)
            .bind(legacy_types())
            .fetch_all(pool)
            .await
    }

    /// Count of a user's non-legacy badges, for the rewards summary.
    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rewards WHERE user_id = $1 AND badge_type <> ALL($2)",
        )
        .bind(user_id)
        .bind(legacy_types())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Delete every row carrying a retired badge type, across all users.
    /// Returns the purged row count.
    pub async fn purge_legacy(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rewards WHERE badge_type = ANY($1)")
            .bind(legacy_types())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete all of a user's badges (admin progress reset).
    pub async fn delete_by_user(
        executor: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rewards WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
