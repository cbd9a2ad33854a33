//! # DomainError
//!
//! Centralized error handling for the Whispering Walls ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g., Whisper, Reply, Theme)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., text too long, empty report reason)
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or rejected admin assertion
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate tag name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, transaction rolled back)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Shorthand for a not-found error on a uuid-keyed entity.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound(entity, id.to_string())
    }
}

/// A specialized Result type for Whispering Walls logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
