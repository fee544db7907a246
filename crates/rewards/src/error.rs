//! Error type shared by the synchronous reward paths.

use praxia_core::error::CoreError;

/// Failure of a synchronous reward operation.
///
/// Domain rejections (validation, insufficient points, conflicts) keep their
/// [`CoreError`] classification so the HTTP layer can map them to status
/// codes; everything else is a database error.
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
