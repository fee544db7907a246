//! Class session and attendance models and DTOs.

use praxia_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored values for `attendance_records.status`.
pub const ATTENDANCE_PRESENT: &str = "present";
pub const ATTENDANCE_ABSENT: &str = "absent";

/// A row from the `class_sessions` table: one class held at a branch on a
/// given day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassSession {
    pub id: DbId,
    pub branch: String,
    pub session_date: Day,
    pub created_at: Timestamp,
}

/// A row from the `attendance_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub class_session_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub t_shirt_worn: bool,
    pub created_at: Timestamp,
}

/// DTO for scheduling a class session.
#[derive(Debug, Deserialize)]
pub struct CreateClassSession {
    pub branch: String,
    pub session_date: Day,
}

/// DTO for marking one student's attendance at a class session.
#[derive(Debug, Deserialize)]
pub struct MarkAttendance {
    pub user_id: DbId,
    pub status: String,
    #[serde(default)]
    pub t_shirt_worn: bool,
}

/// Per-user monthly attendance figures consumed by the badge evaluation.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct MonthAttendance {
    pub present: i64,
    pub t_shirt_worn: i64,
}
