//! User entity model and DTOs.

use praxia_core::grace::GraceSkipState;
use praxia_core::streak::StreakState;
use praxia_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub total_points: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_questions_attempted: i64,
    pub last_practice_date: Option<Day>,
    pub last_grace_skip_date: Option<Day>,
    pub grace_skip_week_start: Option<Day>,
    pub last_daily_login_bonus_date: Option<Day>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The streak columns as the domain state machine sees them.
    pub fn streak_state(&self) -> StreakState {
        StreakState {
            current: self.current_streak,
            longest: self.longest_streak,
            last_practice_date: self.last_practice_date,
        }
    }

    /// The grace skip columns as the domain rules see them.
    pub fn grace_skip_state(&self) -> GraceSkipState {
        GraceSkipState {
            week_start: self.grace_skip_week_start,
            last_used: self.last_grace_skip_date,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub total_points: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
            total_points: u.total_points,
            current_streak: u.current_streak,
            longest_streak: u.longest_streak,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
