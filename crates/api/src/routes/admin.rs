//! Admin routes. Every handler behind these asserts the admin role itself.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/points", put(admin::adjust_points))
        .route("/users/{id}/profile", patch(admin::update_profile))
        .route("/users/{id}/reset-progress", post(admin::reset_progress))
        .route("/users/{id}", delete(admin::deactivate_user))
        .route("/rewards/evaluate-monthly", post(admin::evaluate_monthly))
        .route("/rewards/purge-legacy", post(admin::purge_legacy))
}
