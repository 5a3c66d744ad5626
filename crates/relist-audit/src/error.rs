//! Error types for relist-audit.

use thiserror::Error;

/// Errors that can occur while recording audit events.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Event could not be serialized for the backend.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
