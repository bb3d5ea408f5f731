//! Domain error types.

use thiserror::Error;

use crate::ids::UserId;

/// Errors raised by Data Store implementations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No record exists for the user.
    #[error("quest progress not found for user {0}")]
    NotFound(UserId),

    /// Optimistic concurrency conflict: another write landed first.
    #[error("concurrency conflict on user {user_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The user whose record had the conflict.
        user_id: UserId,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
