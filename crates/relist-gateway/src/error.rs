//! Server-level error types.

use thiserror::Error;

/// Errors from the TCP server loop (distinct from the per-request
/// [`crate::ApiError`] taxonomy, which is part of the wire protocol).
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be parsed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Startup configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
}
