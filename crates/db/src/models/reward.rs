//! Earned badge model.

use praxia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rewards` table.
///
/// Lifetime and SUPER badges have `month_earned = NULL` and are unique per
/// (user, badge_type); monthly badges carry a `YYYY-MM` key and are unique
/// per (user, badge_type, month).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reward {
    pub id: DbId,
    pub user_id: DbId,
    pub badge_type: String,
    pub badge_name: String,
    pub badge_category: String,
    pub is_lifetime: bool,
    pub month_earned: Option<String>,
    pub earned_at: Timestamp,
}
