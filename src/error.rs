//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache engine itself.
///
/// A miss is never an error: lookups return `Option`. Only programmer
/// errors at construction time end up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be at least one entry
    #[error("Invalid capacity: {capacity} (must be at least 1)")]
    InvalidCapacity { capacity: usize },
}

// == Repository Error Enum ==
/// Errors raised by the bundled in-memory repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store refused the operation
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// Unexpected failure inside the backing store
    #[error("Repository internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_message() {
        let err = CacheError::InvalidCapacity { capacity: 0 };
        assert_eq!(err.to_string(), "Invalid capacity: 0 (must be at least 1)");
    }

    #[test]
    fn test_repository_error_message() {
        let err = RepositoryError::Unavailable("write rejected".to_string());
        assert_eq!(err.to_string(), "Repository unavailable: write rejected");
    }
}
