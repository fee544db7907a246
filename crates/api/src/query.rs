//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Hard cap on page size, applied regardless of what the client asks for.
const MAX_LIMIT: i64 = 100;

/// Default page size when `limit` is absent.
const DEFAULT_LIMIT: i64 = 20;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Requested limit clamped to `[1, 100]`, defaulting to 20.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Requested offset floored at 0.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
