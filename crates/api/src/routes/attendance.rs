//! Attendance routes (admin-gated in the handlers).

use axum::routing::post;
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/class-sessions", post(attendance::create_session))
        .route(
            "/class-sessions/{id}/records",
            post(attendance::mark).get(attendance::list_records),
        )
}
