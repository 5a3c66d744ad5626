//! Audit event types.
//!
//! This module defines all financially- and security-relevant events the
//! core can emit.

use chrono::{DateTime, Utc};
use relist_core::{ActorId, DisputeId, ListingId, Money, OrderId, RequestId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AuditError;

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational event (e.g. a routine transition).
    Info = 0,
    /// Low severity (e.g. a single rate-limit hit).
    Low = 1,
    /// Medium severity (e.g. auth failure, money movement).
    Medium = 2,
    /// High severity (e.g. a deadline fired and moved money without a user).
    High = 3,
}

impl Severity {
    /// Returns the string representation of this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who caused an event: a user action or the deadline sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "actor")]
pub enum Initiator {
    /// A user action carried out through the gateway.
    User(ActorId),
    /// A system-initiated transition (deadline sweep).
    System,
}

impl Initiator {
    /// True for system-initiated events.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

/// Escrow money movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    /// Funds authorized against the buyer.
    Hold,
    /// Authorized funds captured into escrow.
    Capture,
    /// Escrowed funds released to the seller.
    Release,
    /// Escrowed funds returned to the buyer.
    Refund,
    /// Uncaptured authorization cancelled.
    Void,
}

/// The audit event taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum AuditKind {
    /// An order changed status.
    OrderTransition {
        /// The order.
        order_id: OrderId,
        /// Previous status.
        from: String,
        /// New status.
        to: String,
    },
    /// Money moved on an order's escrow hold.
    EscrowMovement {
        /// The order.
        order_id: OrderId,
        /// The movement applied.
        movement: Movement,
        /// Amount moved (as a two-decimal string to preserve precision).
        amount: Money,
    },
    /// A dispute changed status.
    DisputeLifecycle {
        /// The dispute.
        dispute_id: DisputeId,
        /// The order under dispute.
        order_id: OrderId,
        /// New dispute status.
        status: String,
    },
    /// A reviewer decided a verification request.
    VerificationDecision {
        /// The request.
        request_id: RequestId,
        /// The listing being verified.
        listing_id: ListingId,
        /// Decision label (approved level, rejected, flagged).
        decision: String,
    },
    /// An actor exceeded a rate limit.
    RateLimitExceeded {
        /// Offending actor.
        actor: ActorId,
        /// The limited action.
        action: String,
    },
    /// A bearer token failed to authenticate.
    AuthFailure {
        /// Reason for failure.
        reason: String,
    },
}

impl AuditKind {
    /// Short type label for log lines.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::OrderTransition { .. } => "order_transition",
            Self::EscrowMovement { .. } => "escrow_movement",
            Self::DisputeLifecycle { .. } => "dispute_lifecycle",
            Self::VerificationDecision { .. } => "verification_decision",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::AuthFailure { .. } => "auth_failure",
        }
    }
}

/// An audit event with its envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event id.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Who caused it.
    pub initiator: Initiator,
    /// What happened.
    pub kind: AuditKind,
}

impl AuditEvent {
    /// Creates an event stamped now.
    #[must_use]
    pub fn new(initiator: Initiator, kind: AuditKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            initiator,
            kind,
        }
    }

    /// An order status transition.
    #[must_use]
    pub fn order_transition(
        initiator: Initiator,
        order_id: OrderId,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::new(
            initiator,
            AuditKind::OrderTransition { order_id, from: from.into(), to: to.into() },
        )
    }

    /// An escrow money movement.
    #[must_use]
    pub fn escrow_movement(
        initiator: Initiator,
        order_id: OrderId,
        movement: Movement,
        amount: Money,
    ) -> Self {
        Self::new(initiator, AuditKind::EscrowMovement { order_id, movement, amount })
    }

    /// A dispute lifecycle change.
    #[must_use]
    pub fn dispute_lifecycle(
        initiator: Initiator,
        dispute_id: DisputeId,
        order_id: OrderId,
        status: impl Into<String>,
    ) -> Self {
        Self::new(
            initiator,
            AuditKind::DisputeLifecycle { dispute_id, order_id, status: status.into() },
        )
    }

    /// A verification decision.
    #[must_use]
    pub fn verification_decision(
        reviewer: ActorId,
        request_id: RequestId,
        listing_id: ListingId,
        decision: impl Into<String>,
    ) -> Self {
        Self::new(
            Initiator::User(reviewer),
            AuditKind::VerificationDecision {
                request_id,
                listing_id,
                decision: decision.into(),
            },
        )
    }

    /// A rate-limit violation.
    #[must_use]
    pub fn rate_limit_exceeded(actor: ActorId, action: impl Into<String>) -> Self {
        Self::new(
            Initiator::User(actor),
            AuditKind::RateLimitExceeded { actor, action: action.into() },
        )
    }

    /// An authentication failure.
    #[must_use]
    pub fn auth_failure(reason: impl Into<String>) -> Self {
        Self::new(Initiator::System, AuditKind::AuthFailure { reason: reason.into() })
    }

    /// Severity of this event.
    ///
    /// System-initiated money movement is the loudest thing this core does.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match &self.kind {
            AuditKind::EscrowMovement { .. } => {
                if self.initiator.is_system() {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            AuditKind::OrderTransition { .. } | AuditKind::DisputeLifecycle { .. } => {
                if self.initiator.is_system() {
                    Severity::High
                } else {
                    Severity::Info
                }
            }
            AuditKind::VerificationDecision { .. } => Severity::Info,
            AuditKind::RateLimitExceeded { .. } => Severity::Low,
            AuditKind::AuthFailure { .. } => Severity::Medium,
        }
    }

    /// Short type label for log lines.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    /// Serializes the event to JSON.
    pub fn to_json(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string(self)?)
    }
}
