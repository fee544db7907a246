//! Handler for `/leaderboard`: weekly snapshot rankings.

use axum::extract::{Query, State};
use axum::Json;
use praxia_db::models::leaderboard::RankedEntry;
use praxia_db::repositories::LeaderboardRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_TOP: i64 = 10;
const MAX_TOP: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

/// Top rankings plus the caller's own row when present in the snapshot.
#[derive(Debug, Serialize)]
pub struct LeaderboardView {
    pub top: Vec<RankedEntry>,
    pub me: Option<RankedEntry>,
}

/// GET /api/v1/leaderboard
///
/// Read from the most recent snapshot; rankings move when the worker or an
/// admin adjustment refreshes it, not on every read.
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<Json<DataResponse<LeaderboardView>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP).clamp(1, MAX_TOP);

    let top = LeaderboardRepo::top(&state.pool, limit).await?;
    let me = LeaderboardRepo::rank_for_user(&state.pool, auth_user.user_id).await?;

    Ok(Json(DataResponse::new(LeaderboardView { top, me })))
}
