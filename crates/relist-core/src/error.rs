//! Error types for relist-core.

use thiserror::Error;

/// Errors that can occur in core primitive operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid amount (overflow, negative, or malformed decimal).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed entity identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
