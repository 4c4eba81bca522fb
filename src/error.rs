//! Service-level error taxonomy.

use derive_more::{Display, Error};

use crate::db::{DbError, DbErrorKind};

/// Domain error surfaced by [`ScoreService`] operations.
///
/// `NotFound`, `Validation`, and `Conflict` are recoverable domain
/// errors for the caller to surface; `Store` wraps an infrastructure
/// failure from the database layer and is retryable.
///
/// Computation-undefined cases (empty best-climb window, zero days
/// climbed) are not errors: they surface as absent fields in the
/// report types.
///
/// [`ScoreService`]: crate::ScoreService
#[derive(Debug, Clone, Display, Error)]
pub enum ServiceError {
    /// A referenced climber, wall, or score does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The request failed input validation.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] String),
    /// A unique key was violated (e.g. duplicate email).
    #[display("conflict: {_0}")]
    Conflict(#[error(not(source))] String),
    /// The underlying store failed; the operation may be retried.
    #[display("storage failure: {_0}")]
    Store(DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err.kind {
            DbErrorKind::UniqueViolation => Self::Conflict(err.message),
            _ => Self::Store(err),
        }
    }
}
