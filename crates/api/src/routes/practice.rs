//! Practice session routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::practice;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(practice::submit).get(practice::list))
}
