//! Handlers for `/rewards`: progress summary, badge cabinet and grace skips.

use axum::extract::State;
use axum::Json;
use praxia_core::badges::{super_progress, SuperProgress};
use praxia_core::error::CoreError;
use praxia_core::grace::GraceSkipState;
use praxia_core::streak::StreakState;
use praxia_db::models::reward::Reward;
use praxia_db::repositories::{RewardRepo, UserRepo};
use praxia_rewards::{GraceSkipOutcome, RewardAggregator};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// One-screen progress overview for the authenticated student.
#[derive(Debug, Serialize)]
pub struct RewardsSummary {
    pub total_points: i64,
    pub total_questions_attempted: i64,
    pub streak: StreakState,
    pub grace_skip: GraceSkipAvailability,
    pub super_progress: SuperProgress,
    pub badge_count: i64,
}

/// Whether a grace skip could be redeemed right now, and why not if not.
#[derive(Debug, Serialize)]
pub struct GraceSkipAvailability {
    pub can_use: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub state: GraceSkipState,
}

/// GET /api/v1/rewards/summary
pub async fn summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<RewardsSummary>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let badge_count = RewardRepo::count_by_user(&state.pool, user.id).await?;

    let grace_state = user.grace_skip_state();
    let grace_skip = match praxia_core::grace::check_eligibility(
        user.total_points,
        &grace_state,
        chrono::Utc::now().date_naive(),
    ) {
        Ok(()) => GraceSkipAvailability {
            can_use: true,
            reason: None,
            state: grace_state,
        },
        Err(denial) => GraceSkipAvailability {
            can_use: false,
            reason: Some(denial.to_string()),
            state: grace_state,
        },
    };

    let summary = RewardsSummary {
        total_points: user.total_points,
        total_questions_attempted: user.total_questions_attempted,
        streak: user.streak_state(),
        grace_skip,
        super_progress: super_progress(user.total_points),
        badge_count,
    };
    Ok(Json(DataResponse::new(summary)))
}

/// GET /api/v1/rewards/badges
///
/// All badges the user has earned, newest first. Retired badge types are
/// filtered out at the repository level.
pub async fn badges(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Reward>>>> {
    let rewards = RewardRepo::list_by_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(rewards)))
}

/// POST /api/v1/rewards/grace-skip
///
/// Spend points to preserve the current streak across a missed day. At most
/// one redemption per Monday-anchored week.
pub async fn redeem_grace_skip(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<GraceSkipOutcome>>> {
    let outcome = RewardAggregator::redeem_grace_skip(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(outcome)))
}
