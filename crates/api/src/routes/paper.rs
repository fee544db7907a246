//! Paper attempt routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::paper;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(paper::start).get(paper::list))
        .route("/{id}/submit", post(paper::submit))
}
