//! Handlers for `/points`: ledger history with reconciliation.

use axum::extract::{Query, State};
use axum::Json;
use praxia_core::error::CoreError;
use praxia_db::models::points_log::{PointsLogEntry, Reconciliation};
use praxia_db::repositories::{PointsLogRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Ledger page plus an audit of the cached total against the ledger sum.
#[derive(Debug, Serialize)]
pub struct PointsHistory {
    pub entries: Vec<PointsLogEntry>,
    pub reconciliation: Reconciliation,
}

/// GET /api/v1/points/logs
pub async fn logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<PointsHistory>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let entries = PointsLogRepo::list_by_user(
        &state.pool,
        user.id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    let ledger_sum = PointsLogRepo::sum_for_user(&state.pool, user.id).await?;

    let history = PointsHistory {
        entries,
        reconciliation: Reconciliation::new(ledger_sum, user.total_points),
    };
    Ok(Json(DataResponse::new(history)))
}
