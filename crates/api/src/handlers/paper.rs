//! Handlers for `/paper-attempts`: the Vedic Maths paper lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use praxia_core::types::DbId;
use praxia_db::models::paper_attempt::{
    PaperAttemptResponse, StartPaperAttempt, SubmitPaperAttempt,
};
use praxia_db::repositories::PaperAttemptRepo;
use praxia_rewards::{PaperSubmitOutcome, RewardAggregator, STALE_ATTEMPT_AFTER_SECS};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/paper-attempts
///
/// Start a paper attempt. The answer key is stored server-side and never
/// echoed back to the client.
pub async fn start(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<StartPaperAttempt>,
) -> AppResult<(StatusCode, Json<DataResponse<PaperAttemptResponse>>)> {
    let attempt = RewardAggregator::start_paper(&state.pool, auth_user.user_id, &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(PaperAttemptResponse::from(attempt))),
    ))
}

/// POST /api/v1/paper-attempts/{id}/submit
///
/// Grade the submitted answers against the stored key and credit the points.
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(attempt_id): Path<DbId>,
    Json(input): Json<SubmitPaperAttempt>,
) -> AppResult<Json<DataResponse<PaperSubmitOutcome>>> {
    let outcome = RewardAggregator::submit_paper(
        &state.pool,
        &state.reward_queue,
        auth_user.user_id,
        attempt_id,
        &input,
    )
    .await?;

    Ok(Json(DataResponse::new(outcome)))
}

/// GET /api/v1/paper-attempts
///
/// The authenticated user's paper attempts, most recent first. Abandoned
/// attempts past the staleness window are closed out first so the listing
/// never shows a stuck `in_progress` row.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PaperAttemptResponse>>>> {
    let cutoff = Utc::now() - chrono::Duration::seconds(STALE_ATTEMPT_AFTER_SECS);
    PaperAttemptRepo::expire_stale_for_user(&state.pool, auth_user.user_id, cutoff).await?;

    let attempts = PaperAttemptRepo::list_by_user(
        &state.pool,
        auth_user.user_id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    let responses: Vec<PaperAttemptResponse> =
        attempts.into_iter().map(PaperAttemptResponse::from).collect();
    Ok(Json(DataResponse::new(responses)))
}
