//! Repository for `class_sessions` and `attendance_records`.

use praxia_core::types::{Day, DbId};
use sqlx::PgPool;

use crate::models::attendance::{
    AttendanceRecord, ClassSession, CreateClassSession, MarkAttendance, MonthAttendance,
};

/// Column list for `class_sessions` queries.
const SESSION_COLUMNS: &str = "id, branch, session_date, created_at";

/// Column list for `attendance_records` queries.
const RECORD_COLUMNS: &str = "id, class_session_id, user_id, status, t_shirt_worn, created_at";

/// Class scheduling and per-student attendance, read by the monthly badge
/// evaluation.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Schedule a class session. One per (branch, date); a duplicate hits
    /// the unique index.
    pub async fn create_session(
        pool: &PgPool,
        input: &CreateClassSession,
    ) -> Result<ClassSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO class_sessions (branch, session_date)
             VALUES ($1, $2)
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(&input.branch)
            .bind(input.session_date)
            .fetch_one(pool)
            .await
    }

    /// Find a class session by ID.
    pub async fn find_session(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ClassSession>, sqlx::Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM class_sessions WHERE id = $1");
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Branches that held at least one class in `[start, end)`. Drives the
    /// monthly attendance badge pass.
    pub async fn branches_with_sessions_between(
        pool: &PgPool,
        start: Day,
        end: Day,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT branch FROM class_sessions \
             WHERE session_date >= $1 AND session_date < $2 \
             ORDER BY branch",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Number of class sessions held at a branch in `[start, end)`.
    pub async fn count_sessions_between(
        pool: &PgPool,
        branch: &str,
        start: Day,
        end: Day,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM class_sessions \
             WHERE branch = $1 AND session_date >= $2 AND session_date < $3",
        )
        .bind(branch)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Mark (or correct) one student's attendance at a class session.
    pub async fn mark(
        pool: &PgPool,
        class_session_id: DbId,
        input: &MarkAttendance,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records (class_session_id, user_id, status, t_shirt_worn)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (class_session_id, user_id) DO UPDATE SET
                 status = EXCLUDED.status,
                 t_shirt_worn = EXCLUDED.t_shirt_worn
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(class_session_id)
            .bind(input.user_id)
            .bind(&input.status)
            .bind(input.t_shirt_worn)
            .fetch_one(pool)
            .await
    }

    /// All attendance records for a class session.
    pub async fn list_for_session(
        pool: &PgPool,
        class_session_id: DbId,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records \
             WHERE class_session_id = $1 \
             ORDER BY user_id"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(class_session_id)
            .fetch_all(pool)
            .await
    }

    /// One student's attendance figures at a branch over `[start, end)`:
    /// classes marked present and classes attended in the t-shirt.
    pub async fn month_attendance(
        pool: &PgPool,
        user_id: DbId,
        branch: &str,
        start: Day,
        end: Day,
    ) -> Result<MonthAttendance, sqlx::Error> {
        sqlx::query_as::<_, MonthAttendance>(
            "SELECT COUNT(*) FILTER (WHERE ar.status = 'present') AS present, \
                    COUNT(*) FILTER (WHERE ar.t_shirt_worn) AS t_shirt_worn \
             FROM attendance_records ar \
             JOIN class_sessions cs ON cs.id = ar.class_session_id \
             WHERE ar.user_id = $1 \
               AND cs.branch = $2 \
               AND cs.session_date >= $3 AND cs.session_date < $4",
        )
        .bind(user_id)
        .bind(branch)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }
}
