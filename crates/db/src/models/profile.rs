//! Student profile model and DTOs.

use praxia_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `student_profiles` table.
///
/// The course decides which activity kind drives the user's streak: practice
/// sessions for Abacus students, paper attempts for Vedic Maths students.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub branch: String,
    pub course: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Courses with streak-driving activity kinds.
pub const COURSE_ABACUS: &str = "Abacus";
pub const COURSE_VEDIC_MATHS: &str = "Vedic Maths";

/// DTO for creating a student profile.
#[derive(Debug, Deserialize)]
pub struct CreateStudentProfile {
    pub user_id: DbId,
    pub branch: String,
    pub course: String,
}

/// DTO for updating a student profile. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateStudentProfile {
    pub branch: Option<String>,
    pub course: Option<String>,
    pub status: Option<String>,
}
