//! Admin-only handlers: user management, point adjustments and the monthly
//! badge evaluation trigger.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use praxia_core::error::CoreError;
use praxia_core::types::DbId;
use praxia_db::models::profile::{
    StudentProfile, UpdateStudentProfile, COURSE_ABACUS, COURSE_VEDIC_MATHS,
};
use praxia_db::models::user::UserResponse;
use praxia_db::repositories::{ProfileRepo, RewardRepo, UserRepo};
use praxia_rewards::{run_monthly_evaluation, AdjustmentOutcome, MonthlyReport, RewardAggregator};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/points`.
#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    pub total_points: i64,
    pub reason: String,
}

/// Request body for `POST /admin/rewards/evaluate-monthly`.
#[derive(Debug, Deserialize)]
pub struct MonthlyEvaluationRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct PurgeResult {
    pub purged: u64,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse::new(responses)))
}

/// PUT /api/v1/admin/users/{id}/points
///
/// Set a user's point total. The delta lands in the ledger as an
/// adjustment entry so reconciliation keeps holding.
pub async fn adjust_points(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<AdjustPointsRequest>,
) -> AppResult<Json<DataResponse<AdjustmentOutcome>>> {
    if input.reason.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason is required for point adjustments".into(),
        )));
    }

    let outcome = RewardAggregator::adjust_points(
        &state.pool,
        user_id,
        input.total_points,
        input.reason.trim(),
    )
    .await?;
    Ok(Json(DataResponse::new(outcome)))
}

/// POST /api/v1/admin/users/{id}/reset-progress
///
/// Wipe a user's activity, points, streaks and badges. Irreversible.
pub async fn reset_progress(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let reset = RewardAggregator::reset_progress(&state.pool, user_id).await?;
    if !reset {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/admin/users/{id}/profile
///
/// Move a student to another branch or course, or change enrollment status.
/// Only the provided fields are touched.
pub async fn update_profile(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateStudentProfile>,
) -> AppResult<Json<DataResponse<StudentProfile>>> {
    if let Some(course) = &input.course {
        if course != COURSE_ABACUS && course != COURSE_VEDIC_MATHS {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Course must be '{COURSE_ABACUS}' or '{COURSE_VEDIC_MATHS}'"
            ))));
        }
    }
    if let Some(branch) = &input.branch {
        if branch.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Branch must not be empty".into(),
            )));
        }
    }

    let profile = ProfileRepo::update(&state.pool, user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StudentProfile",
            id: user_id,
        }))?;
    Ok(Json(DataResponse::new(profile)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft delete: deactivates the account, history stays.
pub async fn deactivate_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deactivated = UserRepo::deactivate(&state.pool, user_id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/rewards/evaluate-monthly
///
/// Run the month-close badge pass (accuracy, attendance, leaderboard) for
/// the given month. Safe to re-run; already-earned badges are skipped.
pub async fn evaluate_monthly(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(input): Json<MonthlyEvaluationRequest>,
) -> AppResult<Json<DataResponse<MonthlyReport>>> {
    if !(1..=12).contains(&input.month) {
        return Err(AppError::Core(CoreError::Validation(
            "Month must be between 1 and 12".into(),
        )));
    }

    let report = run_monthly_evaluation(&state.pool, input.year, input.month).await?;
    Ok(Json(DataResponse::new(report)))
}

/// POST /api/v1/admin/rewards/purge-legacy
///
/// Delete rows for retired badge types.
pub async fn purge_legacy(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<DataResponse<PurgeResult>>> {
    let purged = RewardRepo::purge_legacy(&state.pool).await?;
    tracing::info!(purged, "Purged legacy badge rows");
    Ok(Json(DataResponse::new(PurgeResult { purged })))
}
