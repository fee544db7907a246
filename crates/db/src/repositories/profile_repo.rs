//! Repository for the `student_profiles` table.

use praxia_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateStudentProfile, StudentProfile, UpdateStudentProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, branch, course, status, created_at, updated_at";

/// Provides CRUD operations for student profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a profile for a user, returning the created row. One profile
    /// per user; a second insert hits the unique index.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStudentProfile,
    ) -> Result<StudentProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO student_profiles (user_id, branch, course)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(input.user_id)
            .bind(&input.branch)
            .bind(&input.course)
            .fetch_one(pool)
            .await
    }

    /// Find the profile belonging to a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_profiles WHERE user_id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List profiles at a branch, for the monthly attendance evaluation.
    pub async fn list_by_branch(
        pool: &PgPool,
        branch: &str,
    ) -> Result<Vec<StudentProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM student_profiles \
             WHERE branch = $1 AND status = 'active' \
             ORDER BY user_id"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(branch)
            .fetch_all(pool)
            .await
    }

    /// Update a profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the user has no profile.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateStudentProfile,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE student_profiles SET
                branch = COALESCE($2, branch),
                course = COALESCE($3, course),
                status = COALESCE($4, status)
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(user_id)
            .bind(&input.branch)
            .bind(&input.course)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }
}
