//! Leaderboard cache models.

use praxia_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Leaderboard row joined with the username, for API reads.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RankedEntry {
    pub rank: Option<i32>,
    pub user_id: DbId,
    pub username: String,
    pub total_points: i64,
    pub weekly_points: i64,
}
