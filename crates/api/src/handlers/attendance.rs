//! Handlers for `/attendance`: class sessions and attendance records.
//!
//! All writes here are admin-only; the records feed the monthly attendance
//! and t-shirt badge evaluation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use praxia_core::error::CoreError;
use praxia_core::types::DbId;
use praxia_db::models::attendance::{
    AttendanceRecord, ClassSession, CreateClassSession, MarkAttendance, ATTENDANCE_ABSENT,
    ATTENDANCE_PRESENT,
};
use praxia_db::repositories::{AttendanceRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/attendance/class-sessions
///
/// Schedule a class session at a branch. One per (branch, date).
pub async fn create_session(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(input): Json<CreateClassSession>,
) -> AppResult<(StatusCode, Json<DataResponse<ClassSession>>)> {
    if input.branch.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Branch must not be empty".into(),
        )));
    }

    let session = AttendanceRepo::create_session(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(session))))
}

/// POST /api/v1/attendance/class-sessions/{id}/records
///
/// Mark (or correct) one student's attendance at a class session.
pub async fn mark(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(session_id): Path<DbId>,
    Json(input): Json<MarkAttendance>,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    if input.status != ATTENDANCE_PRESENT && input.status != ATTENDANCE_ABSENT {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Status must be '{ATTENDANCE_PRESENT}' or '{ATTENDANCE_ABSENT}'"
        ))));
    }

    AttendanceRepo::find_session(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id: session_id,
        }))?;
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let record = AttendanceRepo::mark(&state.pool, session_id, &input).await?;
    Ok(Json(DataResponse::new(record)))
}

/// GET /api/v1/attendance/class-sessions/{id}/records
pub async fn list_records(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttendanceRecord>>>> {
    AttendanceRepo::find_session(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id: session_id,
        }))?;

    let records = AttendanceRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse::new(records)))
}
