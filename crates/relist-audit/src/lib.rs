//! # relist-audit
//!
//! Audit logging for the Relist escrow core.
//!
//! Every financial movement and state transition is a security-relevant
//! event: orders change hands, money moves, deadlines fire without a user
//! at the keyboard. This crate provides a lightweight, pluggable audit log
//! that integrates with the existing `tracing` infrastructure:
//!
//! - [`AuditEvent`] — the event taxonomy, each stamped with its
//!   [`Initiator`] (user action vs system sweep)
//! - [`AuditLogger`] — pluggable backend trait
//! - [`TracingAuditLogger`] — default implementation over `tracing`
//! - [`NoopAuditLogger`] — discard-everything backend for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod logger;

pub use error::AuditError;
pub use events::{AuditEvent, AuditKind, Initiator, Movement, Severity};
pub use logger::{AuditLogger, NoopAuditLogger, TracingAuditLogger};
