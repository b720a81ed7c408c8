//! Error taxonomy.
//!
//! Three distinct failure classes with different handling:
//! - [`EngineError::Validation`] — bad input (unknown plot, no active
//!   templates, missing proposal); rejected before any write.
//! - [`EngineError::Store`] — the backing store failed; the operation
//!   aborts with the underlying message, no retry.
//! - [`FeedError`] — sensor/weather/predictor transport failures. These
//!   are handled fail-open at the call site (empty forecast, skipped
//!   task, default prediction) and never surface as an `EngineError`.

use thiserror::Error;

/// A backing-store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error: {message}")]
pub struct StoreError {
    /// Message from the underlying store.
    pub message: String,
}

impl StoreError {
    /// Creates a store error from the underlying message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An external feed failure (sensor, weather, predictor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feed error: {message}")]
pub struct FeedError {
    /// Message from the feed transport.
    pub message: String,
}

impl FeedError {
    /// Creates a feed error from the underlying message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Invalid input; nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backing store failed; the operation was aborted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EngineError::validation("unknown plot P009");
        assert_eq!(err.to_string(), "validation error: unknown plot P009");

        let err = EngineError::from(StoreError::new("connection reset"));
        assert_eq!(err.to_string(), "store error: connection reset");

        let err = FeedError::new("timeout");
        assert_eq!(err.to_string(), "feed error: timeout");
    }
}
