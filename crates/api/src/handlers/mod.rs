//! HTTP request handlers grouped by resource.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod leaderboard;
pub mod paper;
pub mod points;
pub mod practice;
pub mod rewards;
