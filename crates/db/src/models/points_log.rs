//! Points ledger model and DTOs.

use praxia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Stored values for `points_log.source_type`.
pub mod source {
    pub const MENTAL_MATH: &str = "mental_math";
    pub const PAPER_ATTEMPT: &str = "paper_attempt";
    pub const DAILY_LOGIN: &str = "daily_login";
    pub const STREAK_BONUS: &str = "streak_bonus";
    pub const GRACE_SKIP: &str = "grace_skip";
    pub const ADMIN_ADJUSTMENT: &str = "admin_adjustment";
}

/// A row from the append-only `points_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PointsLogEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub points: i64,
    pub source_type: String,
    pub source_id: Option<DbId>,
    pub description: String,
    pub extra_data: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// Fields for appending one ledger entry.
#[derive(Debug, Clone)]
pub struct CreatePointsEntry {
    pub user_id: DbId,
    pub points: i64,
    pub source_type: String,
    pub source_id: Option<DbId>,
    pub description: String,
    pub extra_data: Option<serde_json::Value>,
}

/// Ledger-vs-cache audit for one user. `matches` is false when the cached
/// total has drifted from the ledger sum; the drift is reported, never
/// auto-corrected.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub sum_from_ledger: i64,
    pub cached_total: i64,
    pub matches: bool,
}

impl Reconciliation {
    pub fn new(sum_from_ledger: i64, cached_total: i64) -> Self {
        Self {
            sum_from_ledger,
            cached_total,
            matches: sum_from_ledger == cached_total,
        }
    }
}
