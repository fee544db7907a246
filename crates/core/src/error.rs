//! Domain error taxonomy shared by all crates.

use crate::types::DbId;

/// Domain-level errors. The API layer maps each variant to an HTTP status:
/// NotFound -> 404, Validation -> 400, Conflict -> 409, Unauthorized -> 401,
/// Forbidden -> 403, Internal -> 500.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed a business rule before any write happened.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An invariant the caller cannot fix was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}
