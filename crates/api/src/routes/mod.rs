//! Route definitions for the praxia API.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod paper;
pub mod points;
pub mod practice;
pub mod rewards;

use axum::Router;

use crate::state::AppState;

/// Build all versioned API routes under their resource prefixes.
///
/// Mounted under `/api/v1` by `main.rs`; the health endpoint stays at the
/// root, outside the versioned tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/practice-sessions", practice::router())
        .nest("/paper-attempts", paper::router())
        .nest("/rewards", rewards::router())
        .nest("/points", points::router())
        .nest("/attendance", attendance::router())
        .nest("/leaderboard", leaderboard::router())
        .nest("/admin", admin::router())
}
