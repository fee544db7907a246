//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the `Deserialize` DTOs its write paths need.

pub mod attendance;
pub mod leaderboard;
pub mod paper_attempt;
pub mod points_log;
pub mod practice_session;
pub mod profile;
pub mod reward;
pub mod session;
pub mod user;
