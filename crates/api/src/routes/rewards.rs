//! Reward and badge routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rewards;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(rewards::summary))
        .route("/badges", get(rewards::badges))
        .route("/grace-skip", post(rewards::redeem_grace_skip))
}
