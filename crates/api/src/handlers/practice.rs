//! Handlers for `/practice-sessions`: mental math submissions and history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use praxia_db::models::practice_session::{CreatePracticeSession, PracticeSession};
use praxia_db::repositories::PracticeSessionRepo;
use praxia_rewards::{PracticeOutcome, RewardAggregator};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/practice-sessions
///
/// Record a completed mental math session and credit its points. Streak and
/// badge updates happen asynchronously in the reward worker.
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreatePracticeSession>,
) -> AppResult<(StatusCode, Json<DataResponse<PracticeOutcome>>)> {
    let outcome = RewardAggregator::submit_practice(
        &state.pool,
        &state.reward_queue,
        auth_user.user_id,
        &input,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(outcome))))
}

/// GET /api/v1/practice-sessions
///
/// The authenticated user's practice history, most recent first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PracticeSession>>>> {
    let sessions = PracticeSessionRepo::list_by_user(
        &state.pool,
        auth_user.user_id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(DataResponse::new(sessions)))
}
