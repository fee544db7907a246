use std::sync::Arc;

use praxia_rewards::RewardQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: praxia_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Sending half of the reward queue; handlers enqueue one job per
    /// completed activity.
    pub reward_queue: RewardQueue,
}
