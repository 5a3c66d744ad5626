//! Audit logging backends.
//!
//! This module provides the [`AuditLogger`] trait and default
//! implementations.

use crate::events::{AuditEvent, Severity};

/// Trait for audit logging backends.
///
/// Implement this trait to create custom audit log destinations
/// (e.g. file, database, external SIEM).
pub trait AuditLogger: Send + Sync {
    /// Logs an audit event.
    fn log(&self, event: &AuditEvent);

    /// Logs an audit event if the severity is at or above the minimum.
    fn log_if_severe(&self, event: &AuditEvent, min_severity: Severity) {
        if event.severity() >= min_severity {
            self.log(event);
        }
    }
}

/// Audit logger that uses the `tracing` infrastructure.
///
/// Events are logged at levels matching their severity:
/// - Info, Low → `tracing::info!`
/// - Medium → `tracing::warn!`
/// - High → `tracing::error!`
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLogger {
    /// Optional prefix for all log messages.
    prefix: Option<String>,
}

impl TracingAuditLogger {
    /// Creates a new tracing-based audit logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new tracing-based audit logger with a prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()) }
    }
}

impl AuditLogger for TracingAuditLogger {
    fn log(&self, event: &AuditEvent) {
        let event_id = event.id;
        let event_type = event.event_type();
        let severity = event.severity();
        let system_initiated = event.initiator.is_system();

        // Serialize to JSON for structured logging (ignore errors).
        let json = event.to_json().unwrap_or_else(|_| "{}".to_string());

        let prefix = self.prefix.as_deref().unwrap_or("AUDIT");

        match severity {
            Severity::Info | Severity::Low => {
                tracing::info!(
                    target: "relist_audit",
                    %event_id,
                    %event_type,
                    %severity,
                    system_initiated,
                    event_json = %json,
                    "[{prefix}] {event_type}"
                );
            }
            Severity::Medium => {
                tracing::warn!(
                    target: "relist_audit",
                    %event_id,
                    %event_type,
                    %severity,
                    system_initiated,
                    event_json = %json,
                    "[{prefix}] {event_type}"
                );
            }
            Severity::High => {
                tracing::error!(
                    target: "relist_audit",
                    %event_id,
                    %event_type,
                    %severity,
                    system_initiated,
                    event_json = %json,
                    "[{prefix}] {event_type}"
                );
            }
        }
    }
}

/// Audit logger that discards all events. Useful in unit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLogger;

impl NoopAuditLogger {
    /// Creates a no-op logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLogger for NoopAuditLogger {
    fn log(&self, _event: &AuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Initiator;
    use relist_core::OrderId;

    #[test]
    fn tracing_logger_does_not_panic() {
        let logger = TracingAuditLogger::with_prefix("TEST");
        let event = AuditEvent::order_transition(
            Initiator::System,
            OrderId::new(),
            "confirmed",
            "cancelled",
        );
        logger.log(&event);
    }

    #[test]
    fn log_if_severe_filters() {
        // NoopAuditLogger with default method; just exercise the filter path.
        let logger = NoopAuditLogger::new();
        let event = AuditEvent::auth_failure("bad token");
        logger.log_if_severe(&event, Severity::High);
        logger.log_if_severe(&event, Severity::Info);
    }
}
