use crate::store::StoreError;
use thiserror::Error;

/// Engine errors.
///
/// Store failures propagate unchanged: the engine performs no retry or
/// backoff of its own, retry UX belongs to the caller. A provider touching
/// another provider's items is NOT represented here - that is a silent
/// no-op inside an otherwise-successful mutation, not a failure.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BookingError {
    /// Whether the caller may meaningfully retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Store(StoreError::Unavailable(_)))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
